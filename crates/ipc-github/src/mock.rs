//! In-memory CI service for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use ipc_types::WorkflowRun;

use crate::{CiError, CiService, RunFilter};

#[derive(Default)]
struct MockState {
    runs: Vec<WorkflowRun>,
    comments: HashMap<u64, Vec<String>>,
    messages: HashMap<String, String>,
    failure: Option<CiError>,
    calls: HashMap<&'static str, usize>,
}

/// CI service backed by in-memory runs, comments and commit messages.
///
/// Posted comments are appended to the pull request's comment list, so a
/// later `list_issue_comments` sees them. An injected failure is returned by
/// every call until cleared.
#[derive(Default)]
pub struct MockCiService {
    state: Mutex<MockState>,
}

impl MockCiService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a run. Runs are listed in insertion order, so add newest first.
    pub fn with_run(self, run: WorkflowRun) -> Self {
        self.lock().runs.push(run);
        self
    }

    pub fn with_commit_message(self, sha: impl Into<String>, message: impl Into<String>) -> Self {
        self.lock().messages.insert(sha.into(), message.into());
        self
    }

    pub fn with_comment(self, pr_number: u64, body: impl Into<String>) -> Self {
        self.lock()
            .comments
            .entry(pr_number)
            .or_default()
            .push(body.into());
        self
    }

    /// Make every subsequent call fail with `error` (`None` to recover).
    pub fn set_failure(&self, error: Option<CiError>) {
        self.lock().failure = error;
    }

    /// Comments currently on a pull request.
    pub fn comments(&self, pr_number: u64) -> Vec<String> {
        self.lock()
            .comments
            .get(&pr_number)
            .cloned()
            .unwrap_or_default()
    }

    /// How many times `method` was called (failed calls included).
    pub fn call_count(&self, method: &str) -> usize {
        self.lock().calls.get(method).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record a call and return the injected failure, if any.
    fn enter(&self, method: &'static str) -> Result<std::sync::MutexGuard<'_, MockState>, CiError> {
        let mut state = self.lock();
        *state.calls.entry(method).or_insert(0) += 1;
        if let Some(err) = state.failure.clone() {
            return Err(err);
        }
        Ok(state)
    }
}

#[async_trait]
impl CiService for MockCiService {
    async fn list_workflow_runs(
        &self,
        filter: &RunFilter,
        limit: usize,
    ) -> Result<Vec<WorkflowRun>, CiError> {
        let state = self.enter("list_workflow_runs")?;
        Ok(state
            .runs
            .iter()
            .filter(|run| filter.matches(run))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_issue_comments(&self, pr_number: u64) -> Result<Vec<String>, CiError> {
        let state = self.enter("list_issue_comments")?;
        Ok(state.comments.get(&pr_number).cloned().unwrap_or_default())
    }

    async fn create_issue_comment(&self, pr_number: u64, body: &str) -> Result<(), CiError> {
        let mut state = self.enter("create_issue_comment")?;
        state
            .comments
            .entry(pr_number)
            .or_default()
            .push(body.to_string());
        Ok(())
    }

    async fn commit_message(&self, sha: &str) -> Result<String, CiError> {
        let state = self.enter("commit_message")?;
        state
            .messages
            .get(sha)
            .cloned()
            .ok_or_else(|| CiError::Status {
                status: 404,
                body: format!("No commit found for SHA: {sha}"),
            })
    }
}
