//! Error types for the IPC robot domain layer.

use thiserror::Error;

/// Error type for loading and validating settings.
#[derive(Debug, Error)]
pub enum IpcError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for IpcError {
    fn from(err: config::ConfigError) -> Self {
        IpcError::Config(err.to_string())
    }
}
