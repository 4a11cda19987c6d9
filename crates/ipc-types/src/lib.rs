//! # ipc-types
//!
//! Shared domain types for the IPC robot.
//!
//! This crate defines the data structures passed between the CI client,
//! the perf aggregator and the publisher:
//! - Runs: snapshots of CI workflow runs and their pull requests
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use ipc_types::{short_sha, RunCommit};
//!
//! let pair = RunCommit::new(101, "0123456789abcdef0123456789abcdef01234567");
//! assert_eq!(short_sha(&pair.commit_sha), "0123456");
//! ```

pub mod config;
pub mod error;
pub mod run;

pub use config::{PerfSettings, RobotSettings, RunKey, Settings};
pub use error::IpcError;
pub use run::{short_sha, PullRequestRef, RunCommit, WorkflowRun, SHORT_SHA_LEN};
