//! `bearing-middleware` – sample routing
//!
//! Moves sensor samples and derived signals between the stream manager and
//! whichever consumers care about them, without interpreting the data.
//!
//! # Modules
//!
//! - [`bus`] – Typed, topic-based publish/subscribe event bus built on Tokio
//!   broadcast channels.

pub mod bus;

pub use bus::{EventBus, Topic, TopicReceiver};
