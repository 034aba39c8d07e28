//! Error taxonomy for the lifecycle engine.
//!
//! Two classes matter to callers: the request was bad before we touched the
//! provider (`Validation`), or the provider itself failed (`Provider`). The
//! HTTP layer maps the former to 400 and the latter to 500.

use thiserror::Error;

/// Errors surfaced by the instance lifecycle engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The caller supplied an incomplete or invalid request. Raised before
    /// any provider call is issued.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A provider call failed (network, auth, quota, not-found). Carries the
    /// underlying cause for logging and the 500-response `details` field.
    #[error("provider request failed: {source:#}")]
    Provider {
        #[source]
        source: anyhow::Error,
    },
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn provider(source: anyhow::Error) -> Self {
        Self::Provider { source }
    }

    /// True when this error should surface as a caller mistake (HTTP 400).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
