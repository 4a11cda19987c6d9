//! Run resolution: from CI runs to (directory key, commit) pairs.
//!
//! Remote failures are returned unchanged; recovering from them is the
//! publisher loop's job.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use ipc_types::{RunCommit, RunKey, WorkflowRun};

use crate::{CiError, CiService, RunFilter};

/// First line of a commit message.
pub fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().to_string()
}

/// Resolves recent runs and commit metadata through a [`CiService`].
#[derive(Clone)]
pub struct RunResolver {
    client: Arc<dyn CiService>,
    run_key: RunKey,
}

impl RunResolver {
    pub fn new(client: Arc<dyn CiService>, run_key: RunKey) -> Self {
        Self { client, run_key }
    }

    pub fn run_key(&self) -> RunKey {
        self.run_key
    }

    /// The `limit` most recent runs on `branch`, newest first.
    pub async fn resolve_recent(
        &self,
        branch: &str,
        limit: usize,
    ) -> Result<Vec<RunCommit>, CiError> {
        let runs = self
            .client
            .list_workflow_runs(&RunFilter::branch(branch), limit)
            .await?;
        info!(branch, count = runs.len(), "Resolved recent runs");

        Ok(runs
            .iter()
            .take(limit)
            .map(|run| run.run_commit(self.run_key))
            .collect())
    }

    /// First line of each commit's message, one lookup per SHA.
    pub async fn resolve_messages(
        &self,
        shas: &[String],
    ) -> Result<HashMap<String, String>, CiError> {
        let mut messages = HashMap::with_capacity(shas.len());
        for sha in shas {
            if messages.contains_key(sha) {
                continue;
            }
            let message = self.client.commit_message(sha).await?;
            debug!(commit = %sha, "Fetched commit message");
            messages.insert(sha.clone(), first_line(&message));
        }
        Ok(messages)
    }

    /// Recent successful pull-request runs, newest first.
    pub async fn resolve_pull_request_runs(
        &self,
        limit: usize,
    ) -> Result<Vec<WorkflowRun>, CiError> {
        let filter = RunFilter::successful_pull_requests();
        let runs = self.client.list_workflow_runs(&filter, limit).await?;

        Ok(runs
            .into_iter()
            .filter(|run| filter.matches(run))
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use ipc_types::PullRequestRef;

    use super::*;
    use crate::MockCiService;

    fn run(number: u64, branch: &str, event: &str, pr: Option<u64>) -> WorkflowRun {
        WorkflowRun {
            id: 10_000 + number,
            run_number: number,
            head_sha: format!("{number:040}"),
            head_branch: branch.to_string(),
            event: event.to_string(),
            conclusion: Some("success".to_string()),
            created_at: None,
            associated_pull_request: pr.map(|number| PullRequestRef { number }),
        }
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("Fix ROB\n\nLonger description"), "Fix ROB");
        assert_eq!(first_line("single"), "single");
        assert_eq!(first_line(""), "");
    }

    #[tokio::test]
    async fn test_resolve_recent_uses_run_key() {
        let mock = Arc::new(
            MockCiService::new()
                .with_run(run(12, "master", "push", None))
                .with_run(run(11, "feature", "push", None))
                .with_run(run(10, "master", "push", None)),
        );

        let resolver = RunResolver::new(mock.clone(), RunKey::Number);
        let pairs = resolver.resolve_recent("master", 5).await.unwrap();
        assert_eq!(
            pairs,
            [
                RunCommit::new(12, format!("{:040}", 12)),
                RunCommit::new(10, format!("{:040}", 10)),
            ]
        );

        let resolver = RunResolver::new(mock, RunKey::Id);
        let pairs = resolver.resolve_recent("master", 1).await.unwrap();
        assert_eq!(pairs, [RunCommit::new(10_012, format!("{:040}", 12))]);
    }

    #[tokio::test]
    async fn test_resolve_messages_first_line_only() {
        let mock = Arc::new(
            MockCiService::new()
                .with_commit_message("a", "Bump difftest\n\nSigned-off-by: x")
                .with_commit_message("b", "Fix typo"),
        );
        let resolver = RunResolver::new(mock.clone(), RunKey::Number);

        let shas = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let messages = resolver.resolve_messages(&shas).await.unwrap();
        assert_eq!(messages["a"], "Bump difftest");
        assert_eq!(messages["b"], "Fix typo");
        assert_eq!(mock.call_count("commit_message"), 2);
    }

    #[tokio::test]
    async fn test_resolve_pull_request_runs() {
        let mock = Arc::new(
            MockCiService::new()
                .with_run(run(3, "pr-a", "pull_request", Some(30)))
                .with_run(run(2, "master", "push", None))
                .with_run(run(1, "pr-b", "pull_request", None)),
        );
        let resolver = RunResolver::new(mock, RunKey::Number);

        let runs = resolver.resolve_pull_request_runs(15).await.unwrap();
        assert_eq!(runs.iter().map(|r| r.run_number).collect::<Vec<_>>(), [3, 1]);
        assert_eq!(
            runs[0].associated_pull_request,
            Some(PullRequestRef { number: 30 })
        );
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let mock = Arc::new(MockCiService::new());
        mock.set_failure(Some(CiError::Http("connection reset".to_string())));
        let resolver = RunResolver::new(mock, RunKey::Number);

        assert!(matches!(
            resolver.resolve_recent("master", 10).await,
            Err(CiError::Http(_))
        ));
    }
}
