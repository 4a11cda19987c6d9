//! CI run snapshots.
//!
//! A `WorkflowRun` is fetched fresh for every query and never persisted.
//! The commit SHA is the external key that ties a run to its perf logs,
//! its pull request and any report already posted there.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RunKey;

/// Number of characters kept when a SHA is shown in a table.
pub const SHORT_SHA_LEN: usize = 7;

/// Abbreviate a commit SHA for display.
pub fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(SHORT_SHA_LEN) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

/// Pull request a run was triggered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Pull request number (also its issue number)
    pub number: u64,
}

/// One execution of a CI workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Globally unique run id
    pub id: u64,
    /// Sequential run number within the workflow
    pub run_number: u64,
    /// Full 40-hex commit SHA the run built
    pub head_sha: String,
    pub head_branch: String,
    /// Triggering event ("push", "pull_request", ...)
    pub event: String,
    pub conclusion: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// First pull request associated with the run, if any
    pub associated_pull_request: Option<PullRequestRef>,
}

impl WorkflowRun {
    /// Identifier naming this run's perf log directory.
    pub fn perf_key(&self, key: RunKey) -> u64 {
        match key {
            RunKey::Number => self.run_number,
            RunKey::Id => self.id,
        }
    }

    pub fn short_sha(&self) -> &str {
        short_sha(&self.head_sha)
    }

    /// The (directory key, commit) pair the aggregator consumes.
    pub fn run_commit(&self, key: RunKey) -> RunCommit {
        RunCommit::new(self.perf_key(key), self.head_sha.clone())
    }
}

/// A run's perf directory key paired with the commit it built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCommit {
    pub run_id: u64,
    pub commit_sha: String,
}

impl RunCommit {
    pub fn new(run_id: u64, commit_sha: impl Into<String>) -> Self {
        Self {
            run_id,
            commit_sha: commit_sha.into(),
        }
    }
}
