//! Directional trigger.
//!
//! Decides whether a [`NormalizedHeading`] lies inside a symmetric tolerance
//! window around geographic north. The window wraps across the 0/360
//! boundary:
//!
//! ```text
//! facing  ⇔  heading ≤ tolerance  ∨  heading ≥ 360 − tolerance
//! ```
//!
//! A missing heading is never "facing" (fail-closed).
//!
//! # Example
//!
//! ```rust
//! use bearing_perception::trigger::{DirectionalTrigger, TriggerConfig};
//! use bearing_types::NormalizedHeading;
//!
//! let trigger = DirectionalTrigger::new(TriggerConfig::default());
//! assert!(trigger.evaluate(NormalizedHeading::new(355)).is_facing());
//! assert!(!trigger.evaluate(NormalizedHeading::new(180)).is_facing());
//! assert!(!trigger.evaluate(None).is_facing());
//! ```

use bearing_types::{FacingState, NormalizedHeading};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default half-width of the accepted window, in degrees.
pub const DEFAULT_TOLERANCE_DEGREES: f64 = 10.0;

/// Tunables for [`DirectionalTrigger`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Half-width of the window around north. Larger values widen the
    /// accepted window; clamped to `[0, 180]`.
    pub tolerance_degrees: f64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            tolerance_degrees: DEFAULT_TOLERANCE_DEGREES,
        }
    }
}

/// Tolerance-window test around north with change detection.
///
/// [`evaluate`][Self::evaluate] is a pure check. [`update`][Self::update]
/// additionally remembers the last result and reports only changes, which
/// is what the stream pipeline uses to keep downstream notifications
/// edge-triggered.
#[derive(Debug, Clone)]
pub struct DirectionalTrigger {
    tolerance: f64,
    last: Option<FacingState>,
}

impl DirectionalTrigger {
    pub fn new(config: TriggerConfig) -> Self {
        let tolerance = if config.tolerance_degrees.is_finite() {
            config.tolerance_degrees.clamp(0.0, 180.0)
        } else {
            DEFAULT_TOLERANCE_DEGREES
        };
        Self {
            tolerance,
            last: None,
        }
    }

    /// The effective (clamped) tolerance in degrees.
    pub fn tolerance_degrees(&self) -> f64 {
        self.tolerance
    }

    /// Whether `heading` lies inside the window around north.
    pub fn evaluate(&self, heading: Option<NormalizedHeading>) -> FacingState {
        match heading {
            Some(h) => {
                let h = f64::from(h.degrees());
                FacingState(h <= self.tolerance || h >= 360.0 - self.tolerance)
            }
            None => FacingState::AWAY,
        }
    }

    /// Evaluate `heading` and return the new state only if it differs from
    /// the previous call's result. The first call after construction or
    /// [`reset`][Self::reset] always reports.
    pub fn update(&mut self, heading: Option<NormalizedHeading>) -> Option<FacingState> {
        let state = self.evaluate(heading);
        if self.last == Some(state) {
            return None;
        }
        debug!(
            heading = ?heading.map(NormalizedHeading::degrees),
            facing = state.is_facing(),
            "facing state changed"
        );
        self.last = Some(state);
        Some(state)
    }

    /// The most recent result of [`update`][Self::update], if any.
    pub fn last(&self) -> Option<FacingState> {
        self.last
    }

    /// Forget the last reported state.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for DirectionalTrigger {
    fn default() -> Self {
        Self::new(TriggerConfig::default())
    }
}
