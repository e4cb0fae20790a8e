//! [`OverlayStateController`] – gates the supplementary-content view.
//!
//! ```text
//!            confirm() while facing
//!   Hidden ──────────────────────────▶ Revealed
//!     ▲                                   │
//!     └──── close() / drag > threshold ───┘
//! ```
//!
//! Facing alone never reveals anything: it only arms the tap target
//! ([`affordance_visible`][OverlayStateController::affordance_visible]).
//! Losing the facing signal while revealed does not hide the view; only the
//! user does.

use std::sync::Arc;

use bearing_middleware::{EventBus, Topic};
use bearing_types::{Event, EventPayload, FacingState, OverlayState, PropertySnapshot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::content::ContentProvider;

const SOURCE: &str = "bearing-runtime::overlay";

/// Default drag distance, in screen units, that dismisses the overlay.
pub const DEFAULT_DISMISS_THRESHOLD: f64 = 100.0;

/// Tunables for [`OverlayStateController`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// A drag must move strictly farther than this, in the dismiss
    /// direction, to hide the overlay.
    pub dismiss_threshold: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            dismiss_threshold: DEFAULT_DISMISS_THRESHOLD,
        }
    }
}

/// Owns [`OverlayState`] and the payload shown while revealed.
pub struct OverlayStateController {
    state: OverlayState,
    facing: FacingState,
    config: OverlayConfig,
    provider: Arc<dyn ContentProvider>,
    content: Option<PropertySnapshot>,
    drag_origin: Option<f64>,
    bus: EventBus,
}

impl OverlayStateController {
    /// A non-finite or negative threshold falls back to
    /// [`DEFAULT_DISMISS_THRESHOLD`].
    pub fn new(provider: Arc<dyn ContentProvider>, bus: EventBus, mut config: OverlayConfig) -> Self {
        if !(config.dismiss_threshold.is_finite() && config.dismiss_threshold >= 0.0) {
            warn!(
                dismiss_threshold = config.dismiss_threshold,
                "unusable dismiss threshold; using default"
            );
            config.dismiss_threshold = DEFAULT_DISMISS_THRESHOLD;
        }
        Self {
            state: OverlayState::Hidden,
            facing: FacingState::AWAY,
            config,
            provider,
            content: None,
            drag_origin: None,
            bus,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn facing(&self) -> FacingState {
        self.facing
    }

    /// The payload being shown, only while revealed.
    pub fn content(&self) -> Option<&PropertySnapshot> {
        self.content.as_ref()
    }

    /// Whether the reveal affordance should be offered to the user.
    pub fn affordance_visible(&self) -> bool {
        self.state == OverlayState::Hidden && self.facing.is_facing()
    }

    /// Feed the latest facing signal.
    pub fn on_facing(&mut self, facing: FacingState) {
        self.facing = facing;
    }

    /// The user tapped the reveal affordance.
    ///
    /// Reveals only when hidden and currently facing the target, and only if
    /// the content provider yields a payload.
    pub fn confirm(&mut self) -> OverlayState {
        if self.state == OverlayState::Revealed {
            return self.state;
        }
        if !self.facing.is_facing() {
            debug!("reveal ignored: not facing target");
            return self.state;
        }
        match self.provider.snapshot() {
            Ok(snapshot) => {
                self.content = Some(snapshot);
                self.transition(OverlayState::Revealed);
            }
            Err(e) => warn!(error = %e, "content provider failed; overlay stays hidden"),
        }
        self.state
    }

    /// Explicit close action.
    pub fn close(&mut self) -> OverlayState {
        self.hide();
        self.state
    }

    /// A touch went down at vertical position `y`.
    pub fn begin_drag(&mut self, y: f64) {
        if self.state == OverlayState::Revealed {
            self.drag_origin = Some(y);
        }
    }

    /// The touch was released at `y`. Dismisses when the downward
    /// displacement since [`begin_drag`][Self::begin_drag] exceeds the
    /// threshold.
    pub fn end_drag(&mut self, y: f64) -> OverlayState {
        match self.drag_origin.take() {
            Some(origin) => self.drag(y - origin),
            None => self.state,
        }
    }

    /// A completed drag of `displacement` units; positive is the dismiss
    /// direction (downward).
    pub fn drag(&mut self, displacement: f64) -> OverlayState {
        if self.state == OverlayState::Revealed && displacement > self.config.dismiss_threshold {
            debug!(displacement, "dismiss gesture past threshold");
            self.hide();
        }
        self.state
    }

    fn hide(&mut self) {
        self.drag_origin = None;
        if self.state == OverlayState::Hidden {
            return;
        }
        self.content = None;
        self.transition(OverlayState::Hidden);
    }

    fn transition(&mut self, next: OverlayState) {
        info!(from = ?self.state, to = ?next, "overlay transition");
        self.state = next;
        self.bus
            .publish_to(Topic::Overlay, Event::new(SOURCE, EventPayload::Overlay(next)));
    }
}

impl std::fmt::Debug for OverlayStateController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayStateController")
            .field("state", &self.state)
            .field("facing", &self.facing)
            .field("config", &self.config)
            .finish()
    }
}
