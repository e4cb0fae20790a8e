//! `bearing-hal` – Platform sensor abstraction layer
//!
//! Describes the platform facilities the overlay depends on as traits, so
//! the rest of the workspace never talks to a concrete browser, OS, or
//! device API.
//!
//! # Modules
//!
//! - [`geolocation`] – [`GeolocationSource`][geolocation::GeolocationSource]:
//!   continuous position watch with an owned cancellation handle.
//! - [`orientation`] – [`OrientationSource`][orientation::OrientationSource]:
//!   device-orientation event listener registration.
//! - [`consent`] – [`ConsentCapability`][consent::ConsentCapability]: the
//!   optional asynchronous user-consent probe some platforms require before
//!   orientation events fire.
//! - [`sim`] – in-process simulated sources for tests and the CLI shell.

pub mod consent;
pub mod geolocation;
pub mod orientation;
pub mod sim;

pub use consent::{ConsentCapability, ConsentResponse};
pub use geolocation::{GeolocationError, GeolocationSource, WatchHandle, WatchOptions};
pub use orientation::{ListenerHandle, ListenerOptions, OrientationSource};
