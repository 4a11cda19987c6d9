//! CI service access for the IPC robot.
//!
//! Provides:
//! - The pluggable `CiService` trait (list runs, comments, commits; post comments)
//! - `GithubClient`, the GitHub REST implementation with pagination
//! - `MockCiService`, an in-memory implementation for tests
//! - `RunResolver`, which turns runs into the pairs the aggregator consumes

mod api;
mod client;
mod error;
mod mock;
mod resolver;

pub use api::{GithubClient, GithubConfig};
pub use client::{CiService, RunFilter};
pub use error::CiError;
pub use mock::MockCiService;
pub use resolver::{first_line, RunResolver};
