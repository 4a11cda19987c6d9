//! Error types for CI service calls.

use thiserror::Error;

/// Errors returned by a [`CiService`](crate::CiService).
#[derive(Debug, Clone, Error)]
pub enum CiError {
    /// Transport-level failure (DNS, connect, timeout)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Token rejected or lacking permission
    #[error("Authentication failed (HTTP {status}): {body}")]
    Auth { status: u16, body: String },

    #[error("Rate limit exceeded")]
    RateLimited,

    /// Any other non-success response
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// The client could not be constructed
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CiError {
    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, CiError::Config(_))
    }
}

impl From<reqwest::Error> for CiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CiError::Parse(err.to_string())
        } else {
            CiError::Http(err.to_string())
        }
    }
}
