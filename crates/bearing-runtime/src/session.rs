//! [`ArSession`] – wires the sensor pipeline to the overlay for one AR
//! session.
//!
//! The session is the single owner of the [`SensorStreamManager`] and the
//! [`OverlayStateController`]; nothing else mutates either. Facing changes
//! reach the overlay through the event bus and are applied before every
//! user action, so a tap always sees the newest facing signal.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bearing_hal::sim::{SimGeolocation, SimOrientation};
//! use bearing_kernel::PermissionGate;
//! use bearing_runtime::session::{ArSession, SessionConfig};
//! use bearing_runtime::content::StaticContentProvider;
//! use bearing_types::{OrientationSample, OverlayState};
//!
//! let orientation = Arc::new(SimOrientation::new());
//! let mut session = ArSession::new(
//!     Arc::new(SimGeolocation::new()),
//!     orientation.clone(),
//!     PermissionGate::unrestricted(),
//!     Arc::new(StaticContentProvider::demo()),
//!     SessionConfig::default(),
//! ).unwrap();
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! session.start();
//! rt.block_on(session.enable_orientation());
//!
//! orientation.push(OrientationSample::from_compass(-10.0));
//! assert_eq!(session.tap(), OverlayState::Revealed);
//! ```

use std::sync::Arc;

use bearing_hal::{GeolocationSource, OrientationSource};
use bearing_kernel::PermissionGate;
use bearing_middleware::{EventBus, Topic, TopicReceiver, bus::DEFAULT_CAPACITY};
use bearing_types::{BearingError, EventPayload, OverlayState, PropertySnapshot};
use tracing::info;

use crate::content::ContentProvider;
use crate::hud::HudSnapshot;
use crate::overlay::{OverlayConfig, OverlayStateController};
use crate::stream_manager::{OrientationActivation, SensorStreamManager, StreamConfig};

/// Everything tunable about a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub stream: StreamConfig,
    pub overlay: OverlayConfig,
    pub bus_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            overlay: OverlayConfig::default(),
            bus_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// One AR session: sensors, trigger, overlay.
pub struct ArSession {
    streams: SensorStreamManager,
    overlay: OverlayStateController,
    gate: PermissionGate,
    facing_rx: TopicReceiver,
    started: bool,
}

impl ArSession {
    /// Build a session. Nothing is subscribed until [`start`][Self::start].
    ///
    /// # Errors
    ///
    /// Returns [`BearingError::Channel`] for a zero bus capacity.
    pub fn new(
        geolocation: Arc<dyn GeolocationSource>,
        orientation: Arc<dyn OrientationSource>,
        gate: PermissionGate,
        content: Arc<dyn ContentProvider>,
        config: SessionConfig,
    ) -> Result<Self, BearingError> {
        let bus = EventBus::new(config.bus_capacity)?;
        let facing_rx = bus.subscribe_to(Topic::Facing);
        let streams = SensorStreamManager::new(geolocation, orientation, bus.clone(), config.stream);
        let overlay = OverlayStateController::new(content, bus, config.overlay);
        Ok(Self {
            streams,
            overlay,
            gate,
            facing_rx,
            started: false,
        })
    }

    /// The user started the AR view: begin sensing.
    pub fn start(&mut self) {
        if !self.started {
            info!("AR session started");
        }
        self.started = true;
        self.streams.start();
    }

    /// Tear down every sensor subscription. The overlay keeps its state.
    pub fn stop(&mut self) {
        self.streams.stop();
        self.started = false;
        self.sync();
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The user asked to enable orientation. Awaits the consent probe.
    pub async fn enable_orientation(&mut self) -> OrientationActivation {
        let activation = self.streams.enable_orientation(&self.gate).await;
        self.sync();
        activation
    }

    /// Apply every pending facing change to the overlay.
    pub fn sync(&mut self) {
        while let Some(event) = self.facing_rx.try_recv() {
            if let EventPayload::Facing(state) = event.payload {
                self.overlay.on_facing(state);
            }
        }
    }

    /// Tap on the reveal affordance.
    pub fn tap(&mut self) -> OverlayState {
        self.sync();
        self.overlay.confirm()
    }

    /// A completed vertical swipe of `dy` units (positive = downward).
    pub fn swipe(&mut self, dy: f64) -> OverlayState {
        self.sync();
        self.overlay.drag(dy)
    }

    pub fn close(&mut self) -> OverlayState {
        self.overlay.close()
    }

    pub fn overlay_state(&mut self) -> OverlayState {
        self.sync();
        self.overlay.state()
    }

    pub fn affordance_visible(&mut self) -> bool {
        self.sync();
        self.overlay.affordance_visible()
    }

    pub fn content(&self) -> Option<&PropertySnapshot> {
        self.overlay.content()
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::new(&self.streams.snapshot(), self.streams.orientation_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::StaticContentProvider;
    use crate::hud::PLACEHOLDER;
    use bearing_hal::sim::{SimConsent, SimGeolocation, SimOrientation};
    use bearing_kernel::AccessDecision;
    use bearing_types::OrientationSample;

    struct Rig {
        geo: Arc<SimGeolocation>,
        orientation: Arc<SimOrientation>,
        session: ArSession,
    }

    fn rig(gate: PermissionGate) -> Rig {
        let geo = Arc::new(SimGeolocation::new());
        let orientation = Arc::new(SimOrientation::new());
        let session = ArSession::new(
            geo.clone(),
            orientation.clone(),
            gate,
            Arc::new(StaticContentProvider::demo()),
            SessionConfig::default(),
        )
        .unwrap();
        Rig {
            geo,
            orientation,
            session,
        }
    }

    #[test]
    fn nothing_is_sensed_before_start() {
        let r = rig(PermissionGate::unrestricted());
        assert_eq!(r.geo.active_watches(), 0);
        assert_eq!(r.orientation.active_listeners(), 0);
        assert_eq!(r.session.hud().latitude, PLACEHOLDER);
    }

    #[tokio::test]
    async fn compass_minus_ten_reveals_after_tap() {
        let mut r = rig(PermissionGate::new(Arc::new(SimConsent::granting())));
        r.session.start();
        assert_eq!(
            r.session.enable_orientation().await,
            OrientationActivation::Subscribed(AccessDecision::Granted)
        );

        r.orientation.push(OrientationSample::from_compass(-10.0));
        assert_eq!(r.session.hud().heading, "350°");
        assert!(r.session.affordance_visible());
        assert_eq!(r.session.overlay_state(), OverlayState::Hidden);

        assert_eq!(r.session.tap(), OverlayState::Revealed);
        assert!(r.session.content().is_some());

        assert_eq!(r.session.swipe(99.0), OverlayState::Revealed);
        assert_eq!(r.session.swipe(101.0), OverlayState::Hidden);
    }

    #[tokio::test]
    async fn tap_while_facing_away_does_nothing() {
        let mut r = rig(PermissionGate::unrestricted());
        r.session.start();
        r.session.enable_orientation().await;

        r.orientation.push(OrientationSample::from_alpha(180.0));
        assert!(!r.session.affordance_visible());
        assert_eq!(r.session.tap(), OverlayState::Hidden);
    }

    #[tokio::test]
    async fn denied_orientation_keeps_overlay_unreachable() {
        let mut r = rig(PermissionGate::new(Arc::new(SimConsent::denying())));
        r.session.start();
        assert_eq!(
            r.session.enable_orientation().await,
            OrientationActivation::Denied
        );
        r.orientation.push(OrientationSample::from_compass(0.0));
        assert_eq!(r.session.tap(), OverlayState::Hidden);
        assert!(!r.session.hud().orientation_enabled);
        assert_eq!(r.session.hud().heading, PLACEHOLDER);
    }

    #[tokio::test]
    async fn stop_disarms_affordance_but_keeps_revealed_overlay() {
        let mut r = rig(PermissionGate::unrestricted());
        r.session.start();
        r.session.enable_orientation().await;
        r.orientation.push(OrientationSample::from_compass(1.0));
        assert!(r.session.affordance_visible());

        r.session.stop();
        assert!(!r.session.is_started());
        assert!(!r.session.affordance_visible());
        assert_eq!(r.geo.active_watches(), 0);
        assert_eq!(r.orientation.active_listeners(), 0);
    }

    #[test]
    fn zero_capacity_bus_is_rejected() {
        let result = ArSession::new(
            Arc::new(SimGeolocation::new()),
            Arc::new(SimOrientation::new()),
            PermissionGate::unrestricted(),
            Arc::new(StaticContentProvider::demo()),
            SessionConfig {
                bus_capacity: 0,
                ..SessionConfig::default()
            },
        );
        assert!(matches!(result, Err(BearingError::Channel(_))));
    }

    #[tokio::test]
    async fn position_fixes_reach_the_hud() {
        let mut r = rig(PermissionGate::unrestricted());
        r.session.start();
        r.geo.push_coordinates(43.776_412, -79.231_801, 3.0);
        let hud = r.session.hud();
        assert_eq!(hud.latitude, "43.776412");
        assert_eq!(hud.longitude, "-79.231801");
        assert_eq!(hud.accuracy, "±3.00 m");
    }
}
