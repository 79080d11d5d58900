//! Error types for building the HTTP client.

use thiserror::Error;

/// Errors raised while constructing an [`HttpTaskTrigger`](crate::HttpTaskTrigger).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no secret key configured (set TRIGGER_SECRET_KEY or client.secret_key)")]
    MissingSecretKey,

    #[error("invalid api url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}
