//! One publisher pass over recent pull-request runs.

use std::sync::Arc;

use tracing::{debug, info};

use ipc_github::{CiService, RunResolver};
use ipc_perf::PerfAggregator;
use ipc_types::{RunKey, Settings};

use crate::dedup::already_reported;
use crate::report::ReportBuilder;
use crate::PassError;

/// What a pass did with each inspected run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub inspected: usize,
    pub posted: usize,
    pub already_reported: usize,
    pub no_pull_request: usize,
    pub no_perf_data: usize,
}

/// Posts IPC reports on pull requests that do not have one yet.
pub struct Publisher {
    client: Arc<dyn CiService>,
    resolver: RunResolver,
    reports: ReportBuilder,
    run_key: RunKey,
    pull_request_limit: usize,
    settings: Settings,
}

impl Publisher {
    pub fn new(client: Arc<dyn CiService>, aggregator: PerfAggregator, settings: &Settings) -> Self {
        let run_key = settings.perf.run_key;
        let resolver = RunResolver::new(client.clone(), run_key);
        let reports = ReportBuilder::new(
            resolver.clone(),
            aggregator,
            settings.robot.default_branch.clone(),
            settings.robot.default_branch_limit,
        );

        Self {
            client,
            resolver,
            reports,
            run_key,
            pull_request_limit: settings.robot.pull_request_limit,
            settings: settings.clone(),
        }
    }

    /// Inspect recent successful pull-request runs and report on each one
    /// that has perf data and no prior report for its commit.
    ///
    /// Comments are re-read for every run, so two runs of the same commit
    /// in one pass produce a single report.
    pub async fn run_pull_request_pass(&self) -> Result<PassSummary, PassError> {
        let runs = self
            .resolver
            .resolve_pull_request_runs(self.pull_request_limit)
            .await?;
        let mut summary = PassSummary::default();

        for run in &runs {
            summary.inspected += 1;

            let Some(pull_request) = &run.associated_pull_request else {
                debug!(run_id = run.id, commit = %run.head_sha, "Run has no pull request");
                summary.no_pull_request += 1;
                continue;
            };
            let url = self.settings.pull_request_url(pull_request.number);

            let comments = self.client.list_issue_comments(pull_request.number).await?;
            if already_reported(&comments, &run.head_sha) {
                info!(pr = %url, commit = %run.head_sha, "has been commented");
                summary.already_reported += 1;
                continue;
            }

            match self.reports.build(&run.run_commit(self.run_key)).await? {
                Some(body) => {
                    info!(pr = %url, "Create comment:\n{body}");
                    self.client
                        .create_issue_comment(pull_request.number, &body)
                        .await?;
                    summary.posted += 1;
                }
                None => {
                    info!(
                        pr = %url,
                        commit = %run.head_sha,
                        run_id = run.perf_key(self.run_key),
                        branch = %run.head_branch,
                        "perf data not found"
                    );
                    summary.no_perf_data += 1;
                }
            }
        }

        Ok(summary)
    }
}
