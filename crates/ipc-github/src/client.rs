//! The CI service seam.

use async_trait::async_trait;

use ipc_types::WorkflowRun;

use crate::CiError;

/// Which workflow runs to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunFilter {
    /// Runs on a branch, e.g. the default branch
    Branch(String),
    /// Runs triggered by `event` that finished with `status`
    Event { event: String, status: String },
}

impl RunFilter {
    pub fn branch(name: impl Into<String>) -> Self {
        RunFilter::Branch(name.into())
    }

    /// Successful runs triggered by pull requests.
    pub fn successful_pull_requests() -> Self {
        RunFilter::Event {
            event: "pull_request".to_string(),
            status: "success".to_string(),
        }
    }

    /// Query parameters selecting these runs.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            RunFilter::Branch(name) => vec![("branch", name.clone())],
            RunFilter::Event { event, status } => {
                vec![("event", event.clone()), ("status", status.clone())]
            }
        }
    }

    /// Whether `run` would be selected by this filter.
    pub fn matches(&self, run: &WorkflowRun) -> bool {
        match self {
            RunFilter::Branch(name) => run.head_branch == *name,
            RunFilter::Event { event, status } => {
                run.event == *event && run.conclusion.as_deref() == Some(status.as_str())
            }
        }
    }
}

/// Remote CI provider operations used by the robot.
///
/// Every call is a blocking step of the current pass; failures are
/// returned to the caller untouched.
#[async_trait]
pub trait CiService: Send + Sync {
    /// Most recent runs matching `filter`, newest first, at most `limit`.
    async fn list_workflow_runs(
        &self,
        filter: &RunFilter,
        limit: usize,
    ) -> Result<Vec<WorkflowRun>, CiError>;

    /// Bodies of every comment on a pull request, oldest first.
    async fn list_issue_comments(&self, pr_number: u64) -> Result<Vec<String>, CiError>;

    /// Post a new comment on a pull request.
    async fn create_issue_comment(&self, pr_number: u64, body: &str) -> Result<(), CiError>;

    /// Full message of a commit.
    async fn commit_message(&self, sha: &str) -> Result<String, CiError>;
}
