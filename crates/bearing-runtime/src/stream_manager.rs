//! [`SensorStreamManager`] – owns the geolocation and orientation
//! subscriptions and republishes their samples.
//!
//! ```text
//! GeolocationSource ──fix──▶ PositionPipeline ──▶ Topic::Position
//!
//! OrientationSource ──raw──▶ OrientationPipeline
//!        ▲                     ├─ normalize()            ──▶ Topic::Orientation
//!        │                     └─ DirectionalTrigger     ──▶ Topic::Facing (on change)
//!  PermissionGate
//! ```
//!
//! # Lifecycle
//!
//! * [`start`][SensorStreamManager::start] is idempotent: a second call while
//!   running does not open a second watch or listener.
//! * [`stop`][SensorStreamManager::stop] clears both subscriptions, is safe
//!   to call at any time, and is also run on drop.
//! * [`enable_orientation`][SensorStreamManager::enable_orientation] awaits
//!   the [`PermissionGate`]. An allowing answer is remembered for later
//!   restarts. If the manager is stopped when the answer arrives, no
//!   listener is registered; if it was restarted meanwhile, the listener is
//!   registered for the new run.
//!
//! Every subscription carries a liveness flag that is cleared before the
//! platform handle is released, so a source that delivers one more event
//! after cancellation still produces nothing downstream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bearing_hal::geolocation::{GeolocationError, GeolocationSource, WatchHandle, WatchOptions};
use bearing_hal::orientation::{ListenerHandle, ListenerOptions, OrientationSource};
use bearing_kernel::{AccessDecision, PermissionGate};
use bearing_middleware::{EventBus, Topic};
use bearing_perception::heading::normalize;
use bearing_perception::trigger::{DirectionalTrigger, TriggerConfig};
use bearing_types::{
    Event, EventPayload, FacingState, NormalizedHeading, OrientationSample,
    PositionSample, SensorKind,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

const SOURCE: &str = "bearing-runtime::stream_manager";

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

/// Tunables for [`SensorStreamManager`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StreamConfig {
    pub watch_options: WatchOptions,
    pub trigger: TriggerConfig,
}

/// The most recent value seen on each stream. No history is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    pub position: Option<PositionSample>,
    pub orientation: Option<OrientationSample>,
    pub heading: Option<NormalizedHeading>,
    pub facing: FacingState,
}

/// Result of [`SensorStreamManager::enable_orientation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationActivation {
    /// The listener is registered; carries the gate's decision.
    Subscribed(AccessDecision),
    /// A listener was already registered; the gate was not consulted.
    AlreadySubscribed,
    /// The gate refused. The user may retry with a new action.
    Denied,
    /// [`start`][SensorStreamManager::start] has not been called.
    NotRunning,
    /// The manager was stopped while the consent probe was pending.
    Cancelled,
    /// The platform could not register a listener.
    Unavailable,
}

// ────────────────────────────────────────────────────────────────────────────
// Per-sample pipelines
// ────────────────────────────────────────────────────────────────────────────

struct PositionPipeline {
    bus: EventBus,
    latest: Arc<Mutex<SensorSnapshot>>,
    live: Arc<AtomicBool>,
}

impl PositionPipeline {
    fn on_fix(&mut self, sample: PositionSample) {
        if !self.live.load(Ordering::SeqCst) {
            return;
        }
        debug!(
            lat = sample.latitude,
            lon = sample.longitude,
            accuracy_m = sample.accuracy_meters,
            "position fix"
        );
        self.latest.lock().position = Some(sample);
        self.bus
            .publish_to(Topic::Position, Event::new(SOURCE, EventPayload::Position(sample)));
    }

    fn on_error(&mut self, error: GeolocationError) {
        if !self.live.load(Ordering::SeqCst) {
            return;
        }
        // The watch stays registered; the platform may recover on its own.
        warn!(error = %error, "geolocation watch reported a failure");
    }
}

struct OrientationPipeline {
    bus: EventBus,
    latest: Arc<Mutex<SensorSnapshot>>,
    trigger: DirectionalTrigger,
    live: Arc<AtomicBool>,
}

impl OrientationPipeline {
    /// normalize → evaluate → notify, fully, before the next sample.
    fn on_sample(&mut self, sample: OrientationSample) {
        if !self.live.load(Ordering::SeqCst) {
            return;
        }
        let heading = normalize(&sample);
        if heading.is_none() {
            debug!(?sample, "orientation sample carries no usable heading");
        }
        let change = self.trigger.update(heading);
        {
            let mut latest = self.latest.lock();
            latest.orientation = Some(sample);
            latest.heading = heading;
            if let Some(state) = change {
                latest.facing = state;
            }
        }
        self.bus.publish_to(
            Topic::Orientation,
            Event::new(SOURCE, EventPayload::Orientation { sample, heading }),
        );
        if let Some(state) = change {
            self.bus
                .publish_to(Topic::Facing, Event::new(SOURCE, EventPayload::Facing(state)));
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Subscription bookkeeping
// ────────────────────────────────────────────────────────────────────────────

struct Active<H> {
    handle: H,
    live: Arc<AtomicBool>,
}

#[derive(Default)]
struct Subscriptions {
    running: bool,
    /// Bumped on every start and stop.
    epoch: u64,
    orientation_permitted: bool,
    geolocation: Option<Active<WatchHandle>>,
    orientation: Option<Active<ListenerHandle>>,
}

// ────────────────────────────────────────────────────────────────────────────
// SensorStreamManager
// ────────────────────────────────────────────────────────────────────────────

/// Owns the sensor subscriptions and republishes samples on the
/// [`EventBus`].
pub struct SensorStreamManager {
    geolocation: Arc<dyn GeolocationSource>,
    orientation: Arc<dyn OrientationSource>,
    bus: EventBus,
    config: StreamConfig,
    latest: Arc<Mutex<SensorSnapshot>>,
    subs: Mutex<Subscriptions>,
}

impl SensorStreamManager {
    pub fn new(
        geolocation: Arc<dyn GeolocationSource>,
        orientation: Arc<dyn OrientationSource>,
        bus: EventBus,
        config: StreamConfig,
    ) -> Self {
        Self {
            geolocation,
            orientation,
            bus,
            config,
            latest: Arc::new(Mutex::new(SensorSnapshot::default())),
            subs: Mutex::new(Subscriptions::default()),
        }
    }

    /// Start the geolocation watch, and the orientation listener if access
    /// was already granted earlier. No-op while running.
    ///
    /// A missing geolocation facility is logged and published on
    /// [`Topic::SensorFaults`]; it never fails the call.
    pub fn start(&self) {
        let mut subs = self.subs.lock();
        if subs.running {
            debug!("start() while running; keeping existing subscriptions");
            return;
        }
        subs.running = true;
        subs.epoch += 1;
        info!(epoch = subs.epoch, "sensor streams starting");

        self.subscribe_geolocation(&mut subs);
        if subs.orientation_permitted {
            self.subscribe_orientation(&mut subs);
        }
    }

    /// Cancel both subscriptions. Safe to call repeatedly or before
    /// [`start`][Self::start].
    ///
    /// The retained snapshot is cleared. If the device was facing the
    /// target, a final `Facing(false)` is published: without live data the
    /// overlay must not stay armed.
    pub fn stop(&self) {
        let mut subs = self.subs.lock();
        if let Some(active) = subs.geolocation.take() {
            active.live.store(false, Ordering::SeqCst);
            self.geolocation.clear_watch(active.handle);
        }
        if let Some(active) = subs.orientation.take() {
            active.live.store(false, Ordering::SeqCst);
            self.orientation.remove_listener(active.handle);
        }
        if !subs.running {
            return;
        }
        subs.running = false;
        subs.epoch += 1;
        info!(epoch = subs.epoch, "sensor streams stopped");

        // Nothing measured before the stop describes the device afterwards.
        let was_facing = std::mem::take(&mut *self.latest.lock()).facing.is_facing();
        if was_facing {
            self.bus.publish_to(
                Topic::Facing,
                Event::new(SOURCE, EventPayload::Facing(FacingState::AWAY)),
            );
        }
    }

    /// Run the consent handshake and, if allowed, register the orientation
    /// listener.
    ///
    /// The gate is only consulted while the manager is running and no
    /// listener exists yet.
    pub async fn enable_orientation(&self, gate: &PermissionGate) -> OrientationActivation {
        let epoch = {
            let subs = self.subs.lock();
            if !subs.running {
                return OrientationActivation::NotRunning;
            }
            if subs.orientation.is_some() {
                return OrientationActivation::AlreadySubscribed;
            }
            subs.epoch
        };

        let decision = gate.request_orientation_access().await;

        let mut subs = self.subs.lock();
        if let Err(e) = decision.check() {
            self.publish_fault(SensorKind::Orientation, e.to_string());
            return OrientationActivation::Denied;
        }
        subs.orientation_permitted = true;
        if !subs.running {
            info!("orientation consent resolved after stop; not subscribing");
            return OrientationActivation::Cancelled;
        }
        if subs.epoch != epoch {
            // Restarted while the probe was pending; that start could not
            // know the answer yet.
            debug!(epoch = subs.epoch, "consent outlived a restart; subscribing now");
        }
        if subs.orientation.is_some() {
            return OrientationActivation::AlreadySubscribed;
        }
        if self.subscribe_orientation(&mut subs) {
            OrientationActivation::Subscribed(decision)
        } else {
            OrientationActivation::Unavailable
        }
    }

    /// Latest value seen on each stream.
    pub fn snapshot(&self) -> SensorSnapshot {
        *self.latest.lock()
    }

    pub fn is_running(&self) -> bool {
        self.subs.lock().running
    }

    /// Whether the orientation listener is currently registered.
    pub fn orientation_enabled(&self) -> bool {
        self.subs.lock().orientation.is_some()
    }

    // ── internals ───────────────────────────────────────────────────────────

    fn subscribe_geolocation(&self, subs: &mut Subscriptions) {
        if subs.geolocation.is_some() {
            return;
        }
        let live = Arc::new(AtomicBool::new(true));
        let fixes = Arc::new(Mutex::new(PositionPipeline {
            bus: self.bus.clone(),
            latest: self.latest.clone(),
            live: live.clone(),
        }));
        let errors = fixes.clone();

        match self.geolocation.watch_position(
            Box::new(move |sample| fixes.lock().on_fix(sample)),
            Box::new(move |error| errors.lock().on_error(error)),
            self.config.watch_options,
        ) {
            Ok(handle) => {
                debug!(watch_id = handle.id(), "geolocation watch registered");
                subs.geolocation = Some(Active { handle, live });
            }
            Err(e) => {
                warn!(error = %e, "geolocation unavailable");
                self.publish_fault(SensorKind::Geolocation, e.to_string());
            }
        }
    }

    fn subscribe_orientation(&self, subs: &mut Subscriptions) -> bool {
        if subs.orientation.is_some() {
            return true;
        }
        let live = Arc::new(AtomicBool::new(true));
        let mut pipeline = OrientationPipeline {
            bus: self.bus.clone(),
            latest: self.latest.clone(),
            trigger: DirectionalTrigger::new(self.config.trigger),
            live: live.clone(),
        };

        match self.orientation.add_listener(
            Box::new(move |sample| pipeline.on_sample(sample)),
            ListenerOptions { capture: true },
        ) {
            Ok(handle) => {
                debug!(listener_id = handle.id(), "orientation listener registered");
                subs.orientation = Some(Active { handle, live });
                true
            }
            Err(e) => {
                warn!(error = %e, "orientation events unavailable");
                self.publish_fault(SensorKind::Orientation, e.to_string());
                false
            }
        }
    }

    fn publish_fault(&self, sensor: SensorKind, message: String) {
        self.bus.publish_to(
            Topic::SensorFaults,
            Event::new(SOURCE, EventPayload::SensorFault { sensor, message }),
        );
    }
}

impl Drop for SensorStreamManager {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SensorStreamManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subs = self.subs.lock();
        f.debug_struct("SensorStreamManager")
            .field("running", &subs.running)
            .field("geolocation", &subs.geolocation.is_some())
            .field("orientation", &subs.orientation.is_some())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use bearing_hal::sim::{SimConsent, SimGeolocation, SimOrientation};
    use bearing_middleware::TopicReceiver;

    struct Rig {
        geo: Arc<SimGeolocation>,
        orientation: Arc<SimOrientation>,
        bus: EventBus,
        manager: SensorStreamManager,
    }

    fn rig() -> Rig {
        let geo = Arc::new(SimGeolocation::new());
        let orientation = Arc::new(SimOrientation::new());
        let bus = EventBus::default();
        let manager = SensorStreamManager::new(
            geo.clone(),
            orientation.clone(),
            bus.clone(),
            StreamConfig::default(),
        );
        Rig {
            geo,
            orientation,
            bus,
            manager,
        }
    }

    fn headings(rx: &mut TopicReceiver) -> Vec<Option<u16>> {
        rx.drain()
            .into_iter()
            .filter_map(|e| match e.payload {
                EventPayload::Orientation { heading, .. } => {
                    Some(heading.map(NormalizedHeading::degrees))
                }
                _ => None,
            })
            .collect()
    }

    fn facings(rx: &mut TopicReceiver) -> Vec<bool> {
        rx.drain()
            .into_iter()
            .filter_map(|e| match e.payload {
                EventPayload::Facing(state) => Some(state.is_facing()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_watches_geolocation_with_fresh_high_accuracy_options() {
        let r = rig();
        r.manager.start();
        assert_eq!(r.geo.active_watches(), 1);
        let opts = r.geo.watch_options()[0];
        assert!(opts.high_accuracy);
        assert_eq!(opts.timeout, Duration::from_secs(10));
        assert_eq!(opts.maximum_age, Duration::ZERO);
        // orientation waits for the gate
        assert_eq!(r.orientation.active_listeners(), 0);
    }

    #[test]
    fn start_twice_keeps_one_subscription() {
        let r = rig();
        let mut rx = r.bus.subscribe_to(Topic::Position);
        r.manager.start();
        r.manager.start();
        assert_eq!(r.geo.active_watches(), 1);

        r.geo.push_coordinates(43.7764, -79.2318, 3.5);
        assert_eq!(rx.drain().len(), 1);
    }

    #[test]
    fn stop_without_start_is_safe() {
        let r = rig();
        r.manager.stop();
        r.manager.stop();
        assert!(!r.manager.is_running());
    }

    #[test]
    fn stop_after_start_silences_both_streams() {
        let r = rig();
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        r.manager.start();
        let activation = rt.block_on(r.manager.enable_orientation(&PermissionGate::unrestricted()));
        assert_eq!(
            activation,
            OrientationActivation::Subscribed(AccessDecision::NotRequired)
        );

        let mut positions = r.bus.subscribe_to(Topic::Position);
        let mut orientations = r.bus.subscribe_to(Topic::Orientation);
        r.manager.stop();
        assert_eq!(r.geo.active_watches(), 0);
        assert_eq!(r.orientation.active_listeners(), 0);

        r.geo.push_coordinates(1.0, 2.0, 3.0);
        r.orientation.push(OrientationSample::from_compass(0.0));
        assert!(positions.drain().is_empty());
        assert!(orientations.drain().is_empty());
    }

    /// Keeps every callback after removal and fires them on demand, like a
    /// platform that delivers one more event after cancellation.
    #[derive(Default)]
    struct LeakySources {
        fixes: Mutex<Vec<bearing_hal::geolocation::PositionCallback>>,
        listeners: Mutex<Vec<bearing_hal::orientation::OrientationCallback>>,
    }

    impl LeakySources {
        fn fire(&self) {
            for on_fix in self.fixes.lock().iter_mut() {
                on_fix(PositionSample {
                    latitude: 1.0,
                    longitude: 2.0,
                    accuracy_meters: 3.0,
                    captured_at: chrono::Utc::now(),
                });
            }
            for listener in self.listeners.lock().iter_mut() {
                listener(OrientationSample::from_compass(0.0));
            }
        }
    }

    impl GeolocationSource for LeakySources {
        fn watch_position(
            &self,
            on_fix: bearing_hal::geolocation::PositionCallback,
            _on_error: bearing_hal::geolocation::PositionErrorCallback,
            _options: WatchOptions,
        ) -> Result<WatchHandle, bearing_types::BearingError> {
            self.fixes.lock().push(on_fix);
            Ok(WatchHandle::new(1))
        }

        fn clear_watch(&self, _handle: WatchHandle) {}
    }

    impl OrientationSource for LeakySources {
        fn add_listener(
            &self,
            listener: bearing_hal::orientation::OrientationCallback,
            _options: ListenerOptions,
        ) -> Result<ListenerHandle, bearing_types::BearingError> {
            self.listeners.lock().push(listener);
            Ok(ListenerHandle::new(1))
        }

        fn remove_listener(&self, _handle: ListenerHandle) {}
    }

    #[tokio::test]
    async fn late_events_after_stop_are_dropped() {
        let sources = Arc::new(LeakySources::default());
        let bus = EventBus::default();
        let manager = SensorStreamManager::new(
            sources.clone(),
            sources.clone(),
            bus.clone(),
            StreamConfig::default(),
        );
        manager.start();
        manager
            .enable_orientation(&PermissionGate::unrestricted())
            .await;

        let mut positions = bus.subscribe_to(Topic::Position);
        let mut orientations = bus.subscribe_to(Topic::Orientation);
        let mut facing = bus.subscribe_to(Topic::Facing);
        sources.fire();
        assert_eq!(positions.drain().len(), 1);
        assert_eq!(orientations.drain().len(), 1);
        assert_eq!(facings(&mut facing), vec![true]);

        manager.stop();
        assert_eq!(facings(&mut facing), vec![false]);
        sources.fire();
        assert!(positions.drain().is_empty());
        assert!(orientations.drain().is_empty());
        assert!(facing.drain().is_empty());
        assert_eq!(manager.snapshot(), SensorSnapshot::default());
    }

    #[test]
    fn position_fix_is_republished_and_retained() {
        let r = rig();
        let mut rx = r.bus.subscribe_to(Topic::Position);
        r.manager.start();
        r.geo.push_coordinates(43.776_412, -79.231_801, 4.25);

        let events = rx.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].payload, EventPayload::Position(_)));
        let latest = r.manager.snapshot().position.expect("fix retained");
        assert_eq!(latest.latitude, 43.776_412);
        assert_eq!(latest.accuracy_meters, 4.25);
    }

    #[test]
    fn geolocation_failure_emits_nothing_and_keeps_watch() {
        let r = rig();
        let mut positions = r.bus.subscribe_to(Topic::Position);
        let mut faults = r.bus.subscribe_to(Topic::SensorFaults);
        r.manager.start();

        r.geo.push_error(GeolocationError::Timeout);
        assert!(positions.drain().is_empty());
        assert!(faults.drain().is_empty());
        assert_eq!(r.geo.active_watches(), 1);

        // the source recovers
        r.geo.push_coordinates(1.0, 1.0, 1.0);
        assert_eq!(positions.drain().len(), 1);
    }

    #[test]
    fn missing_geolocation_is_absorbed_as_fault() {
        let orientation = Arc::new(SimOrientation::new());
        let bus = EventBus::default();
        let mut faults = bus.subscribe_to(Topic::SensorFaults);
        let manager = SensorStreamManager::new(
            Arc::new(SimGeolocation::unavailable()),
            orientation,
            bus,
            StreamConfig::default(),
        );
        manager.start();
        assert!(manager.is_running());
        let events = faults.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].payload,
            EventPayload::SensorFault {
                sensor: SensorKind::Geolocation,
                ..
            }
        ));
        assert!(manager.snapshot().position.is_none());
    }

    #[tokio::test]
    async fn enable_before_start_does_not_probe() {
        let r = rig();
        let consent = Arc::new(SimConsent::granting());
        let gate = PermissionGate::new(consent.clone());
        assert_eq!(
            r.manager.enable_orientation(&gate).await,
            OrientationActivation::NotRunning
        );
        assert_eq!(consent.requests(), 0);
        assert_eq!(r.orientation.active_listeners(), 0);
    }

    #[tokio::test]
    async fn denied_consent_never_subscribes_and_can_retry() {
        let r = rig();
        let consent = Arc::new(SimConsent::denying());
        let gate = PermissionGate::new(consent.clone());
        let mut faults = r.bus.subscribe_to(Topic::SensorFaults);
        r.manager.start();

        assert_eq!(
            r.manager.enable_orientation(&gate).await,
            OrientationActivation::Denied
        );
        assert_eq!(r.orientation.active_listeners(), 0);
        assert!(!r.manager.snapshot().facing.is_facing());
        assert_eq!(faults.drain().len(), 1);

        consent.set_script(bearing_hal::sim::ConsentScript::Respond(
            bearing_hal::ConsentResponse::Granted,
        ));
        assert_eq!(
            r.manager.enable_orientation(&gate).await,
            OrientationActivation::Subscribed(AccessDecision::Granted)
        );
        assert_eq!(r.orientation.active_listeners(), 1);
        assert!(r.orientation.listener_options()[0].capture);
    }

    #[tokio::test]
    async fn enable_twice_registers_one_listener() {
        let r = rig();
        let gate = PermissionGate::unrestricted();
        r.manager.start();
        r.manager.enable_orientation(&gate).await;
        assert_eq!(
            r.manager.enable_orientation(&gate).await,
            OrientationActivation::AlreadySubscribed
        );
        assert_eq!(r.orientation.active_listeners(), 1);
        assert!(r.manager.orientation_enabled());
    }

    #[tokio::test]
    async fn consent_resolving_after_stop_does_not_subscribe() {
        let r = Arc::new(rig());
        let consent = Arc::new(SimConsent::granting().with_delay(Duration::from_millis(50)));
        let gate = PermissionGate::new(consent);
        r.manager.start();

        let pending = {
            let r = r.clone();
            tokio::spawn(async move { r.manager.enable_orientation(&gate).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        r.manager.stop();

        assert_eq!(pending.await.unwrap(), OrientationActivation::Cancelled);
        assert_eq!(r.orientation.active_listeners(), 0);
    }

    #[tokio::test]
    async fn consent_resolving_after_restart_subscribes_new_run() {
        let r = Arc::new(rig());
        let consent = Arc::new(SimConsent::granting().with_delay(Duration::from_millis(50)));
        let gate = PermissionGate::new(consent.clone());
        r.manager.start();

        let pending = {
            let r = r.clone();
            tokio::spawn(async move { r.manager.enable_orientation(&gate).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        r.manager.stop();
        r.manager.start();
        assert_eq!(r.orientation.active_listeners(), 0);

        assert_eq!(
            pending.await.unwrap(),
            OrientationActivation::Subscribed(AccessDecision::Granted)
        );
        assert!(r.manager.is_running());
        assert_eq!(r.orientation.active_listeners(), 1);
        assert_eq!(consent.requests(), 1);

        r.orientation.push(OrientationSample::from_compass(4.0));
        assert!(r.manager.snapshot().facing.is_facing());
    }

    #[tokio::test]
    async fn restart_resubscribes_orientation_without_new_consent() {
        let r = rig();
        let consent = Arc::new(SimConsent::granting());
        let gate = PermissionGate::new(consent.clone());
        r.manager.start();
        r.manager.enable_orientation(&gate).await;
        r.manager.stop();
        assert_eq!(r.orientation.active_listeners(), 0);

        r.manager.start();
        assert_eq!(r.orientation.active_listeners(), 1);
        assert_eq!(r.geo.active_watches(), 1);
        assert_eq!(consent.requests(), 1);
    }

    #[tokio::test]
    async fn orientation_sample_flows_through_normalizer_and_trigger() {
        let r = rig();
        let mut orientations = r.bus.subscribe_to(Topic::Orientation);
        let mut facing = r.bus.subscribe_to(Topic::Facing);
        r.manager.start();
        r.manager
            .enable_orientation(&PermissionGate::unrestricted())
            .await;

        r.orientation.push(OrientationSample::from_compass(-10.0));
        assert_eq!(headings(&mut orientations), vec![Some(350)]);
        assert_eq!(facings(&mut facing), vec![true]);

        let snap = r.manager.snapshot();
        assert_eq!(snap.heading.map(NormalizedHeading::degrees), Some(350));
        assert!(snap.facing.is_facing());
    }

    #[tokio::test]
    async fn facing_notifications_are_edge_triggered() {
        let r = rig();
        let mut facing = r.bus.subscribe_to(Topic::Facing);
        let mut orientations = r.bus.subscribe_to(Topic::Orientation);
        r.manager.start();
        r.manager
            .enable_orientation(&PermissionGate::unrestricted())
            .await;

        for alpha in [180.0, 170.0, 5.0, 355.0, 2.0, 90.0] {
            r.orientation.push(OrientationSample::from_alpha(alpha));
        }
        assert_eq!(facings(&mut facing), vec![false, true, false]);
        assert_eq!(headings(&mut orientations).len(), 6);
    }

    #[tokio::test]
    async fn malformed_sample_fails_closed() {
        let r = rig();
        let mut facing = r.bus.subscribe_to(Topic::Facing);
        r.manager.start();
        r.manager
            .enable_orientation(&PermissionGate::unrestricted())
            .await;

        r.orientation.push(OrientationSample::from_compass(0.0));
        r.orientation.push(OrientationSample::from_alpha(f64::NAN));
        assert_eq!(facings(&mut facing), vec![true, false]);
        assert!(r.manager.snapshot().heading.is_none());
    }

    #[tokio::test]
    async fn stop_while_facing_publishes_facing_false() {
        let r = rig();
        let mut facing = r.bus.subscribe_to(Topic::Facing);
        r.manager.start();
        r.manager
            .enable_orientation(&PermissionGate::unrestricted())
            .await;
        r.orientation.push(OrientationSample::from_compass(3.0));
        r.manager.stop();

        assert_eq!(facings(&mut facing), vec![true, false]);
        assert!(!r.manager.snapshot().facing.is_facing());
    }

    #[tokio::test]
    async fn stop_clears_retained_readings() {
        let r = rig();
        r.manager.start();
        r.manager
            .enable_orientation(&PermissionGate::unrestricted())
            .await;
        r.orientation.push(OrientationSample::from_compass(5.0));
        r.geo.push_coordinates(1.0, 2.0, 3.0);
        assert!(r.manager.snapshot().heading.is_some());

        r.manager.stop();
        let snap = r.manager.snapshot();
        assert!(snap.heading.is_none());
        assert!(snap.orientation.is_none());
        assert!(snap.position.is_none());
        assert!(!snap.facing.is_facing());

        r.manager.start();
        assert_eq!(r.manager.snapshot(), SensorSnapshot::default());
    }

    #[tokio::test]
    async fn unavailable_orientation_reports_unavailable() {
        let bus = EventBus::default();
        let manager = SensorStreamManager::new(
            Arc::new(SimGeolocation::new()),
            Arc::new(SimOrientation::unavailable()),
            bus,
            StreamConfig::default(),
        );
        manager.start();
        assert_eq!(
            manager
                .enable_orientation(&PermissionGate::unrestricted())
                .await,
            OrientationActivation::Unavailable
        );
        assert!(!manager.orientation_enabled());
    }

    #[test]
    fn drop_releases_subscriptions() {
        let geo = Arc::new(SimGeolocation::new());
        {
            let manager = SensorStreamManager::new(
                geo.clone(),
                Arc::new(SimOrientation::new()),
                EventBus::default(),
                StreamConfig::default(),
            );
            manager.start();
            assert_eq!(geo.active_watches(), 1);
        }
        assert_eq!(geo.active_watches(), 0);
    }
}
