//! GitHub REST implementation of [`CiService`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ipc_types::{PullRequestRef, Settings, WorkflowRun};

use crate::{CiError, CiService, RunFilter};

/// GitHub caps `per_page` at 100.
const MAX_PER_PAGE: usize = 100;

/// Configuration for the GitHub client.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// API root (e.g., "https://api.github.com")
    pub base_url: String,

    pub owner: String,

    pub repo: String,

    /// Personal access or app token
    pub token: SecretString,

    /// Request timeout
    pub timeout: Duration,
}

impl GithubConfig {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: SecretString::from(token.into()),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build from loaded settings plus the resolved token.
    pub fn from_settings(settings: &Settings, token: SecretString) -> Self {
        Self {
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            owner: settings.repo_owner.clone(),
            repo: settings.repo_name.clone(),
            token,
            timeout: settings.request_timeout(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Deserialize)]
struct ApiRunsPage {
    workflow_runs: Vec<ApiRun>,
}

#[derive(Deserialize)]
struct ApiRun {
    id: u64,
    run_number: u64,
    head_sha: String,
    #[serde(default)]
    head_branch: Option<String>,
    event: String,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pull_requests: Vec<ApiPullRequest>,
}

#[derive(Deserialize)]
struct ApiPullRequest {
    number: u64,
}

impl From<ApiRun> for WorkflowRun {
    fn from(run: ApiRun) -> Self {
        WorkflowRun {
            id: run.id,
            run_number: run.run_number,
            head_sha: run.head_sha,
            head_branch: run.head_branch.unwrap_or_default(),
            event: run.event,
            conclusion: run.conclusion,
            created_at: run.created_at,
            associated_pull_request: run
                .pull_requests
                .first()
                .map(|pr| PullRequestRef { number: pr.number }),
        }
    }
}

#[derive(Deserialize)]
struct ApiComment {
    #[serde(default)]
    body: Option<String>,
}

#[derive(Deserialize)]
struct ApiCommit {
    commit: ApiCommitDetail,
}

#[derive(Deserialize)]
struct ApiCommitDetail {
    message: String,
}

#[derive(Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

/// GitHub REST API client scoped to one repository.
pub struct GithubClient {
    client: Client,
    config: GithubConfig,
}

impl GithubClient {
    /// Create a new GitHub client.
    pub fn new(config: GithubConfig) -> Result<Self, CiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("ipc-robot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CiError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.config.base_url, self.config.owner, self.config.repo, path
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.config.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CiError> {
        let url = self.repo_url(path);
        debug!(url = %url, ?query, "GET");

        let response = self
            .authorized(self.client.get(&url))
            .query(query)
            .send()
            .await?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| CiError::Parse(e.to_string()))
    }
}

/// Map non-success responses onto [`CiError`].
async fn check_status(response: Response) -> Result<Response, CiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CiError::Auth {
            status: status.as_u16(),
            body,
        },
        StatusCode::TOO_MANY_REQUESTS => CiError::RateLimited,
        _ => CiError::Status {
            status: status.as_u16(),
            body,
        },
    })
}

#[async_trait]
impl CiService for GithubClient {
    async fn list_workflow_runs(
        &self,
        filter: &RunFilter,
        limit: usize,
    ) -> Result<Vec<WorkflowRun>, CiError> {
        let per_page = limit.clamp(1, MAX_PER_PAGE);
        let mut runs: Vec<WorkflowRun> = Vec::with_capacity(limit);
        let mut page = 1usize;

        while runs.len() < limit {
            let mut query = filter.query_pairs();
            query.push(("per_page", per_page.to_string()));
            query.push(("page", page.to_string()));

            let batch: ApiRunsPage = self.get_json("actions/runs", &query).await?;
            let fetched = batch.workflow_runs.len();
            runs.extend(batch.workflow_runs.into_iter().map(WorkflowRun::from));

            if fetched < per_page {
                break;
            }
            page += 1;
        }

        runs.truncate(limit);
        Ok(runs)
    }

    async fn list_issue_comments(&self, pr_number: u64) -> Result<Vec<String>, CiError> {
        let path = format!("issues/{pr_number}/comments");
        let mut bodies = Vec::new();
        let mut page = 1usize;

        loop {
            let query = [
                ("per_page", MAX_PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            let batch: Vec<ApiComment> = self.get_json(&path, &query).await?;
            let fetched = batch.len();
            bodies.extend(batch.into_iter().filter_map(|c| c.body));

            if fetched < MAX_PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(bodies)
    }

    async fn create_issue_comment(&self, pr_number: u64, body: &str) -> Result<(), CiError> {
        let url = self.repo_url(&format!("issues/{pr_number}/comments"));
        debug!(url = %url, "POST");

        let response = self
            .authorized(self.client.post(&url))
            .json(&NewComment { body })
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    async fn commit_message(&self, sha: &str) -> Result<String, CiError> {
        let commit: ApiCommit = self.get_json(&format!("commits/{sha}"), &[]).await?;
        Ok(commit.commit.message)
    }
}
