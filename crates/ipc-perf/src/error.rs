//! Perf layer error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading logs, deriving metrics or rendering tables.
#[derive(Error, Debug)]
pub enum PerfError {
    /// A log file or run directory could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A metric needs a counter the source does not have
    #[error("Counter '{counter}' required by metric '{metric}' not found")]
    MissingCounter { metric: String, counter: String },

    /// A metric produced NaN or infinity (e.g. a zero clock_cycle)
    #[error("Metric '{metric}' evaluated to non-finite value {value}")]
    NonFiniteMetric { metric: String, value: f64 },

    /// The requested metric is not registered
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Evaluation failed for one specific log file
    #[error("{}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: Box<PerfError>,
    },

    /// A table needs at least its header row
    #[error("Cannot render an empty table: no header row")]
    EmptyTable,

    /// CSV read/write failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PerfError {
    /// Whether the error comes from the perf data itself rather than from
    /// how this crate was called.
    pub fn is_data_error(&self) -> bool {
        match self {
            PerfError::Io { .. }
            | PerfError::MissingCounter { .. }
            | PerfError::NonFiniteMetric { .. } => true,
            PerfError::LogFile { source, .. } => source.is_data_error(),
            PerfError::UnknownMetric(_) | PerfError::EmptyTable | PerfError::Csv(_) => false,
        }
    }
}
