//! `bearing-kernel` – access control
//!
//! Decides whether sensor streams are allowed to start at all.
//!
//! # Modules
//!
//! - [`permission_gate`] – [`PermissionGate`][permission_gate::PermissionGate]:
//!   the platform-gated opt-in handshake that must resolve before the
//!   orientation stream may be subscribed.

pub mod permission_gate;

pub use permission_gate::{AccessDecision, PermissionGate};
