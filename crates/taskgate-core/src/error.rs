//! Error types for trigger invocation and payload extraction.

use thiserror::Error;

/// Failure reported by a [`TaskTrigger`](crate::TaskTrigger) backend.
///
/// Passed through [`invoke`](crate::invoke) unmodified.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// The backend answered with a non-success status.
    #[error("trigger rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The backend could not be reached or the exchange broke mid-way.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered but the handle could not be decoded.
    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    #[error("{0}")]
    Other(String),
}

/// Failure reading or parsing a request body in adapters that own body parsing.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to read request body: {0}")]
    Read(String),

    #[error("request body is not valid JSON: {0}")]
    Parse(String),

    #[error("request body exceeds {0} bytes")]
    TooLarge(usize),
}

impl PayloadError {
    /// Parse a buffered body as JSON. An empty body is a `null` payload.
    pub fn parse_json(bytes: &[u8]) -> Result<serde_json::Value, Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(bytes).map_err(|e| PayloadError::Parse(e.to_string()))
    }
}
