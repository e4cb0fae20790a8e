//! `bearing-perception` – heading interpretation layer.
//!
//! Turns raw, platform-shaped orientation samples into the one signal the
//! overlay cares about: is the device facing the target bearing?
//!
//! # Modules
//!
//! - [`heading`] – [`normalize`][heading::normalize]: picks the best raw
//!   heading a sample offers and reduces it to whole degrees in `[0, 360)`.
//! - [`trigger`] – [`DirectionalTrigger`][trigger::DirectionalTrigger]:
//!   tolerance-window test around north with wraparound and edge-triggered
//!   change detection.

pub mod heading;
pub mod trigger;

pub use heading::normalize;
pub use trigger::{DirectionalTrigger, TriggerConfig};
