//! Pass-level error classification.

use thiserror::Error;

use ipc_github::CiError;
use ipc_perf::PerfError;

/// Failure of one publisher pass.
#[derive(Debug, Error)]
pub enum PassError {
    #[error("CI service error: {0}")]
    Ci(#[from] CiError),

    #[error("Perf data error: {0}")]
    Perf(#[from] PerfError),
}

impl PassError {
    /// Recoverable errors are counted and retried on the next pass; anything
    /// else stops the polling loop.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PassError::Ci(err) => err.is_transient(),
            PassError::Perf(err) => err.is_data_error(),
        }
    }
}
