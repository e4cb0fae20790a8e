//! Platform-gated consent probe for orientation access.

use async_trait::async_trait;
use bearing_types::BearingError;

/// What the platform answered when asked for consent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentResponse {
    Granted,
    Denied,
    /// Any other answer (e.g. `"prompt"`, `"default"`). Never treated as
    /// consent.
    Other(String),
}

impl ConsentResponse {
    /// Interpret a platform's textual answer. Only an exact `"granted"`
    /// counts as consent.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "granted" => ConsentResponse::Granted,
            "denied" => ConsentResponse::Denied,
            other => ConsentResponse::Other(other.to_string()),
        }
    }
}

/// The asynchronous consent facility a platform may expose.
///
/// Platforms that deliver orientation events unconditionally simply have no
/// implementation of this trait.
#[async_trait]
pub trait ConsentCapability: Send + Sync {
    /// Ask the user for orientation access and wait for their answer.
    ///
    /// # Errors
    ///
    /// Any error (no user gesture, probe threw, platform refused to ask) is
    /// reported as-is; callers decide what it means.
    async fn request_permission(&self) -> Result<ConsentResponse, BearingError>;
}
