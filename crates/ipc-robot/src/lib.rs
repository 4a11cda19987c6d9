//! IPC robot library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (always-on polling, CSV export)
//! - `dedup`: Detection of previously posted reports
//! - `report`: Report body composition
//! - `publisher`: One pass over recent pull-request runs
//! - `poller`: The continuous polling loop

pub mod cli;
pub mod commands;
pub mod dedup;
pub mod error;
pub mod poller;
pub mod publisher;
pub mod report;

pub use cli::Cli;
pub use commands::{build_context, export_csv, init_logging, load_settings, start_polling, RobotContext};
pub use dedup::{already_reported, commit_line, REPORT_MARKER};
pub use error::PassError;
pub use poller::{PollStats, Poller};
pub use publisher::{PassSummary, Publisher};
pub use report::{default_branch_table, ReportBuilder};
