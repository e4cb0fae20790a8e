//! [`PermissionGate`] – single interception point before the orientation
//! stream is subscribed.
//!
//! Some platforms only deliver orientation events after an explicit,
//! asynchronous user-consent step; others deliver them unconditionally. The
//! gate hides that difference behind one call:
//!
//! 1. **No consent capability** → [`AccessDecision::NotRequired`]; the caller
//!    may subscribe immediately.
//! 2. **Capability present** → the probe is awaited. Only an explicit
//!    "granted" answer yields [`AccessDecision::Granted`]. Any other answer,
//!    and any probe failure, yields [`AccessDecision::Denied`].
//!
//! A denial is never fatal: the gate keeps no memory of it, so a later user
//! action can simply call [`PermissionGate::request_orientation_access`]
//! again.
//!
//! # Example
//!
//! ```
//! use bearing_kernel::{AccessDecision, PermissionGate};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let gate = PermissionGate::unrestricted();
//! let decision = rt.block_on(gate.request_orientation_access());
//! assert_eq!(decision, AccessDecision::NotRequired);
//! ```

use std::sync::Arc;

use bearing_hal::{ConsentCapability, ConsentResponse};
use bearing_types::{BearingError, SensorKind};
use tracing::{info, warn};

/// Outcome of the consent handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied,
    /// The platform has no consent step; events flow unconditionally.
    NotRequired,
}

impl AccessDecision {
    /// Whether the orientation stream may be subscribed.
    pub fn allows_subscription(self) -> bool {
        matches!(self, AccessDecision::Granted | AccessDecision::NotRequired)
    }

    /// `Ok(())` when subscription is allowed, otherwise
    /// [`BearingError::PermissionDenied`].
    pub fn check(self) -> Result<(), BearingError> {
        if self.allows_subscription() {
            Ok(())
        } else {
            Err(BearingError::PermissionDenied(SensorKind::Orientation))
        }
    }
}

/// The gateway every orientation subscription must pass through.
#[derive(Clone, Default)]
pub struct PermissionGate {
    capability: Option<Arc<dyn ConsentCapability>>,
}

impl PermissionGate {
    /// Gate for a platform that exposes a consent probe.
    pub fn new(capability: Arc<dyn ConsentCapability>) -> Self {
        Self {
            capability: Some(capability),
        }
    }

    /// Gate for a platform without a consent step.
    pub fn unrestricted() -> Self {
        Self { capability: None }
    }

    /// Whether this platform requires the consent step.
    pub fn requires_consent(&self) -> bool {
        self.capability.is_some()
    }

    /// Run the consent handshake.
    ///
    /// This is the only suspension point in the sensor pipeline. It never
    /// fails: probe errors are logged and reported as
    /// [`AccessDecision::Denied`].
    pub async fn request_orientation_access(&self) -> AccessDecision {
        let Some(capability) = &self.capability else {
            info!("orientation consent not required on this platform");
            return AccessDecision::NotRequired;
        };

        match capability.request_permission().await {
            Ok(ConsentResponse::Granted) => {
                info!("orientation consent granted");
                AccessDecision::Granted
            }
            Ok(ConsentResponse::Denied) => {
                warn!("orientation consent denied by user");
                AccessDecision::Denied
            }
            Ok(ConsentResponse::Other(answer)) => {
                warn!(%answer, "orientation consent not granted");
                AccessDecision::Denied
            }
            Err(e) => {
                warn!(error = %e, "orientation consent probe failed");
                AccessDecision::Denied
            }
        }
    }
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate")
            .field("requires_consent", &self.requires_consent())
            .finish()
    }
}
