//! Generic `GeolocationSource` trait and supporting types for position
//! watches.

use std::time::Duration;

use bearing_types::{BearingError, PositionSample};
use thiserror::Error;

/// Options passed to [`GeolocationSource::watch_position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Ask the platform for its most accurate (and most power-hungry) fix.
    pub high_accuracy: bool,
    /// Longest the platform may take to produce a fix before reporting
    /// [`GeolocationError::Timeout`].
    pub timeout: Duration,
    /// Oldest cached fix the platform may hand back. Zero means every fix
    /// must be freshly measured.
    pub maximum_age: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(10_000),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Opaque token identifying one active watch. Consumed by
/// [`GeolocationSource::clear_watch`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct WatchHandle(u64);

impl WatchHandle {
    /// Wrap a platform watch id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Failures a watch reports through its error callback. None of them end
/// the watch; the platform keeps trying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    PositionUnavailable(String),
    #[error("timed out waiting for a position fix")]
    Timeout,
}

/// Invoked with every fresh fix.
pub type PositionCallback = Box<dyn FnMut(PositionSample) + Send>;

/// Invoked whenever the watch fails to produce a fix.
pub type PositionErrorCallback = Box<dyn FnMut(GeolocationError) + Send>;

/// A continuous position source.
///
/// Callbacks are invoked serially, one fix at a time, in measurement order.
/// Implementations must stop invoking a watch's callbacks once
/// [`clear_watch`][GeolocationSource::clear_watch] returns for its handle.
pub trait GeolocationSource: Send + Sync {
    /// Start a watch.
    ///
    /// # Errors
    ///
    /// Returns [`BearingError::SensorUnavailable`] when the platform has no
    /// geolocation facility at all.
    fn watch_position(
        &self,
        on_fix: PositionCallback,
        on_error: PositionErrorCallback,
        options: WatchOptions,
    ) -> Result<WatchHandle, BearingError>;

    /// Cancel the watch identified by `handle`. Unknown handles are ignored.
    fn clear_watch(&self, handle: WatchHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_demand_fresh_high_accuracy_fixes() {
        let opts = WatchOptions::default();
        assert!(opts.high_accuracy);
        assert_eq!(opts.timeout, Duration::from_secs(10));
        assert_eq!(opts.maximum_age, Duration::ZERO);
    }

    #[test]
    fn geolocation_error_display() {
        let err = GeolocationError::PositionUnavailable("no satellites".into());
        assert!(err.to_string().contains("no satellites"));
        assert!(GeolocationError::Timeout.to_string().contains("timed out"));
    }
}
