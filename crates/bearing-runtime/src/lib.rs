//! `bearing-runtime` – sensor fusion and overlay orchestration.
//!
//! # Modules
//!
//! - [`stream_manager`] – [`SensorStreamManager`]: owns the geolocation and
//!   orientation subscriptions, feeds orientation samples through heading
//!   normalisation and the [`DirectionalTrigger`][bearing_perception::DirectionalTrigger],
//!   and publishes every result on the event bus.
//! - [`overlay`] – [`OverlayStateController`]: the `Hidden`/`Revealed`
//!   state machine behind the supplementary-content view.
//! - [`content`] – [`ContentProvider`]: the seam that yields the overlay
//!   payload; [`StaticContentProvider`] ships a fixed one.
//! - [`session`] – [`ArSession`]: wires the above together for one session.
//! - [`hud`] – [`HudSnapshot`]: display strings for the live readout.
//! - [`telemetry`] – [`init_tracing`]: global `tracing` subscriber with an
//!   optional OTLP exporter.

pub mod content;
pub mod hud;
pub mod overlay;
pub mod session;
pub mod stream_manager;
pub mod telemetry;

pub use content::{ContentProvider, StaticContentProvider};
pub use hud::HudSnapshot;
pub use overlay::{OverlayConfig, OverlayStateController};
pub use session::{ArSession, SessionConfig};
pub use stream_manager::{OrientationActivation, SensorSnapshot, SensorStreamManager, StreamConfig};
pub use telemetry::{TracerProviderGuard, init_tracing};
