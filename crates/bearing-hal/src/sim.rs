//! In-process simulated sensors for tests and the interactive shell.
//!
//! Every simulated source records its registrations and lets the caller
//! inject events by hand, so the full pipeline can run headless without a
//! phone, a browser, or a GPS receiver.
//!
//! # Stub behaviour
//!
//! | Source | Stub behaviour |
//! |---|---|
//! | [`SimGeolocation`] | Keeps every active watch; [`push_fix`][SimGeolocation::push_fix] / [`push_error`][SimGeolocation::push_error] deliver to all of them. |
//! | [`SimOrientation`] | Keeps every registered listener; [`push`][SimOrientation::push] delivers a sample to all of them. |
//! | [`SimConsent`] | Answers each probe with a scripted response or failure, optionally after a delay. |
//!
//! # Example
//!
//! ```rust
//! use bearing_hal::sim::SimOrientation;
//! use bearing_hal::{ListenerOptions, OrientationSource};
//! use bearing_types::OrientationSample;
//!
//! let source = SimOrientation::new();
//! let handle = source
//!     .add_listener(Box::new(|s| println!("{s:?}")), ListenerOptions::default())
//!     .unwrap();
//! assert_eq!(source.push(OrientationSample::from_compass(12.0)), 1);
//!
//! source.remove_listener(handle);
//! assert_eq!(source.push(OrientationSample::from_compass(12.0)), 0);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bearing_types::{BearingError, OrientationSample, PositionSample, SensorKind};
use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use crate::consent::{ConsentCapability, ConsentResponse};
use crate::geolocation::{
    GeolocationError, GeolocationSource, PositionCallback, PositionErrorCallback, WatchHandle,
    WatchOptions,
};
use crate::orientation::{ListenerHandle, ListenerOptions, OrientationCallback, OrientationSource};

// ────────────────────────────────────────────────────────────────────────────
// Simulated geolocation
// ────────────────────────────────────────────────────────────────────────────

struct SimWatch {
    on_fix: PositionCallback,
    on_error: PositionErrorCallback,
    options: WatchOptions,
}

#[derive(Default)]
struct GeoState {
    next_id: u64,
    watches: HashMap<u64, SimWatch>,
}

/// A simulated position source.
///
/// Callbacks run on the thread that calls `push_*`, while an internal lock is
/// held; they must not call back into this source.
pub struct SimGeolocation {
    available: bool,
    state: Mutex<GeoState>,
}

impl SimGeolocation {
    /// A working geolocation source with no active watches.
    pub fn new() -> Self {
        Self {
            available: true,
            state: Mutex::new(GeoState::default()),
        }
    }

    /// A platform without any geolocation facility; every watch request
    /// fails with [`BearingError::SensorUnavailable`].
    pub fn unavailable() -> Self {
        Self {
            available: false,
            state: Mutex::new(GeoState::default()),
        }
    }

    /// Deliver `sample` to every active watch. Returns how many watches
    /// received it.
    pub fn push_fix(&self, sample: PositionSample) -> usize {
        let mut state = self.state.lock();
        for watch in state.watches.values_mut() {
            (watch.on_fix)(sample);
        }
        state.watches.len()
    }

    /// Deliver a fix at `latitude`/`longitude` stamped with the current time.
    pub fn push_coordinates(&self, latitude: f64, longitude: f64, accuracy_meters: f64) -> usize {
        self.push_fix(PositionSample {
            latitude,
            longitude,
            accuracy_meters,
            captured_at: Utc::now(),
        })
    }

    /// Report `error` to every active watch. The watches stay registered.
    pub fn push_error(&self, error: GeolocationError) -> usize {
        let mut state = self.state.lock();
        for watch in state.watches.values_mut() {
            (watch.on_error)(error.clone());
        }
        state.watches.len()
    }

    /// Number of watches that have been started and not yet cleared.
    pub fn active_watches(&self) -> usize {
        self.state.lock().watches.len()
    }

    /// Options of every active watch, in no particular order.
    pub fn watch_options(&self) -> Vec<WatchOptions> {
        self.state.lock().watches.values().map(|w| w.options).collect()
    }
}

impl Default for SimGeolocation {
    fn default() -> Self {
        Self::new()
    }
}

impl GeolocationSource for SimGeolocation {
    fn watch_position(
        &self,
        on_fix: PositionCallback,
        on_error: PositionErrorCallback,
        options: WatchOptions,
    ) -> Result<WatchHandle, BearingError> {
        if !self.available {
            return Err(BearingError::SensorUnavailable {
                sensor: SensorKind::Geolocation,
                details: "simulated platform has no geolocation".to_string(),
            });
        }
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.watches.insert(
            id,
            SimWatch {
                on_fix,
                on_error,
                options,
            },
        );
        debug!(watch_id = id, "sim geolocation watch started");
        Ok(WatchHandle::new(id))
    }

    fn clear_watch(&self, handle: WatchHandle) {
        if self.state.lock().watches.remove(&handle.id()).is_some() {
            debug!(watch_id = handle.id(), "sim geolocation watch cleared");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated orientation
// ────────────────────────────────────────────────────────────────────────────

struct SimListener {
    callback: OrientationCallback,
    options: ListenerOptions,
}

#[derive(Default)]
struct OrientationState {
    next_id: u64,
    listeners: HashMap<u64, SimListener>,
}

/// A simulated device-orientation event source.
///
/// Same threading rule as [`SimGeolocation`]: listeners run under an
/// internal lock and must not call back into the source.
pub struct SimOrientation {
    available: bool,
    state: Mutex<OrientationState>,
}

impl SimOrientation {
    pub fn new() -> Self {
        Self {
            available: true,
            state: Mutex::new(OrientationState::default()),
        }
    }

    /// A platform that cannot deliver orientation events.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            state: Mutex::new(OrientationState::default()),
        }
    }

    /// Fire `sample` at every registered listener. Returns how many
    /// listeners were invoked.
    pub fn push(&self, sample: OrientationSample) -> usize {
        let mut state = self.state.lock();
        for listener in state.listeners.values_mut() {
            (listener.callback)(sample);
        }
        state.listeners.len()
    }

    pub fn active_listeners(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Options of every registered listener, in no particular order.
    pub fn listener_options(&self) -> Vec<ListenerOptions> {
        self.state.lock()
            .listeners
            .values()
            .map(|l| l.options)
            .collect()
    }
}

impl Default for SimOrientation {
    fn default() -> Self {
        Self::new()
    }
}

impl OrientationSource for SimOrientation {
    fn add_listener(
        &self,
        listener: OrientationCallback,
        options: ListenerOptions,
    ) -> Result<ListenerHandle, BearingError> {
        if !self.available {
            return Err(BearingError::SensorUnavailable {
                sensor: SensorKind::Orientation,
                details: "simulated platform has no orientation events".to_string(),
            });
        }
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.listeners.insert(
            id,
            SimListener {
                callback: listener,
                options,
            },
        );
        debug!(listener_id = id, capture = options.capture, "sim orientation listener added");
        Ok(ListenerHandle::new(id))
    }

    fn remove_listener(&self, handle: ListenerHandle) {
        if self.state.lock().listeners.remove(&handle.id()).is_some() {
            debug!(listener_id = handle.id(), "sim orientation listener removed");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated consent
// ────────────────────────────────────────────────────────────────────────────

/// How a [`SimConsent`] answers the next probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentScript {
    Respond(ConsentResponse),
    /// The probe itself fails (the platform threw).
    Fail(String),
}

/// A simulated consent capability with a scripted answer.
pub struct SimConsent {
    script: Mutex<ConsentScript>,
    delay: Duration,
    requests: AtomicUsize,
}

impl SimConsent {
    pub fn new(script: ConsentScript) -> Self {
        Self {
            script: Mutex::new(script),
            delay: Duration::ZERO,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn granting() -> Self {
        Self::new(ConsentScript::Respond(ConsentResponse::Granted))
    }

    pub fn denying() -> Self {
        Self::new(ConsentScript::Respond(ConsentResponse::Denied))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(ConsentScript::Fail(message.into()))
    }

    /// Wait `delay` before answering each probe.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Change the answer for subsequent probes.
    pub fn set_script(&self, script: ConsentScript) {
        *self.script.lock() = script;
    }

    /// How many probes have been made so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConsentCapability for SimConsent {
    async fn request_permission(&self) -> Result<ConsentResponse, BearingError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let script = self.script.lock().clone();
        match script {
            ConsentScript::Respond(response) => Ok(response),
            ConsentScript::Fail(message) => Err(BearingError::SensorUnavailable {
                sensor: SensorKind::Orientation,
                details: message,
            }),
        }
    }
}
