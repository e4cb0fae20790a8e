//! Typed, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the others.
//!
//! # Topics
//!
//! | Topic | Typical traffic |
//! |---|---|
//! | [`Topic::Position`] | Fresh geolocation fixes |
//! | [`Topic::Orientation`] | Raw orientation samples plus their normalized heading |
//! | [`Topic::Facing`] | Edge-triggered facing-target changes |
//! | [`Topic::Overlay`] | Overlay visibility transitions |
//! | [`Topic::SensorFaults`] | Absorbed sensor failures (unavailable, denied) |

use bearing_types::{BearingError, Event};
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
pub const DEFAULT_CAPACITY: usize = 256;

/// Enumeration of all routing topics on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Position,
    Orientation,
    Facing,
    Overlay,
    SensorFaults,
}

/// Shared event bus. Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    position: broadcast::Sender<Event>,
    orientation: broadcast::Sender<Event>,
    facing: broadcast::Sender<Event>,
    overlay: broadcast::Sender<Event>,
    sensor_faults: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// The `capacity` is applied to every topic channel independently.
    ///
    /// # Errors
    ///
    /// Returns [`BearingError::Channel`] when `capacity` is zero, which Tokio
    /// broadcast channels do not support.
    pub fn new(capacity: usize) -> Result<Self, BearingError> {
        if capacity == 0 {
            return Err(BearingError::Channel(
                "event bus capacity must be greater than zero".to_string(),
            ));
        }
        Ok(Self::with_capacity(capacity))
    }

    /// Publish `event` to the given [`Topic`] channel.
    ///
    /// Returns the number of active receivers that were handed the event.
    /// Returns `0` when nobody is currently listening on the topic; samples
    /// are not buffered for late subscribers.
    pub fn publish_to(&self, topic: Topic, event: Event) -> usize {
        match self.topic_sender(topic).send(event) {
            Ok(n) => n,
            Err(broadcast::error::SendError(_)) => {
                trace!(?topic, "no subscribers; event dropped");
                0
            }
        }
    }

    /// Subscribe to a specific [`Topic`] channel.
    ///
    /// The returned [`TopicReceiver`] yields only events published to that
    /// topic after this call.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    /// Number of live receivers on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topic_sender(topic).receiver_count()
    }

    // `capacity` must be non-zero; broadcast::channel panics otherwise.
    fn with_capacity(capacity: usize) -> Self {
        let (position, _) = broadcast::channel(capacity);
        let (orientation, _) = broadcast::channel(capacity);
        let (facing, _) = broadcast::channel(capacity);
        let (overlay, _) = broadcast::channel(capacity);
        let (sensor_faults, _) = broadcast::channel(capacity);
        Self {
            position,
            orientation,
            facing,
            overlay,
            sensor_faults,
        }
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Position => &self.position,
            Topic::Orientation => &self.orientation,
            Topic::Facing => &self.facing,
            Topic::Overlay => &self.overlay,
            Topic::SensorFaults => &self.sensor_faults,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Topic-based receiver
// ---------------------------------------------------------------------------

/// A receiver bound to a single [`Topic`] channel.
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Return the next already-published event without waiting.
    ///
    /// Returns `None` when nothing is pending or the bus is gone. Lagged
    /// gaps are logged and skipped.
    pub fn try_recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!(topic = ?self.topic, lagged_by = n, "TopicReceiver lagged");
                    continue;
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain every pending event.
    pub fn drain(&mut self) -> Vec<Event> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// The [`Topic`] this receiver is bound to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}
