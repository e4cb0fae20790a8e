//! Generic `OrientationSource` trait for device-orientation events.

use bearing_types::{BearingError, OrientationSample};

/// Registration options for an orientation listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Observe events in the capture phase, before any handler that might
    /// stop their propagation.
    pub capture: bool,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self { capture: true }
    }
}

/// Opaque token identifying one registered listener.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Invoked with every raw orientation event.
pub type OrientationCallback = Box<dyn FnMut(OrientationSample) + Send>;

/// A device-orientation event source.
///
/// Events are delivered serially. After
/// [`remove_listener`][OrientationSource::remove_listener] returns, the
/// removed listener must not be invoked again.
pub trait OrientationSource: Send + Sync {
    /// Register `listener`.
    ///
    /// # Errors
    ///
    /// Returns [`BearingError::SensorUnavailable`] when the platform cannot
    /// deliver orientation events.
    fn add_listener(
        &self,
        listener: OrientationCallback,
        options: ListenerOptions,
    ) -> Result<ListenerHandle, BearingError>;

    /// Unregister a listener. Unknown handles are ignored.
    fn remove_listener(&self, handle: ListenerHandle);
}
