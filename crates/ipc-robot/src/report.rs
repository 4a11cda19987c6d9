//! Report composition.
//!
//! A report is the marker line, the commit line, the single-commit table,
//! a blank line, then the default-branch reference table:
//!
//! ```text
//! [Generated by IPC robot]
//! commit: <full sha>
//! | commit | <benchmark>... |
//! | :---: | :---: ... |
//! | <short sha> | <value>... |
//!
//! master branch:
//! | commit | <benchmark>... |
//! ...
//! ```

use std::slice;

use tracing::info;

use ipc_github::RunResolver;
use ipc_perf::{to_markdown, PerfAggregator, PerfTable};
use ipc_types::RunCommit;

use crate::dedup::{commit_line, REPORT_MARKER};
use crate::PassError;

/// Table of the most recent default-branch runs.
pub async fn default_branch_table(
    resolver: &RunResolver,
    aggregator: &PerfAggregator,
    branch: &str,
    limit: usize,
    with_messages: bool,
) -> Result<PerfTable, PassError> {
    let runs = resolver.resolve_recent(branch, limit).await?;

    let table = if with_messages {
        let shas: Vec<String> = runs.iter().map(|r| r.commit_sha.clone()).collect();
        let messages = resolver.resolve_messages(&shas).await?;
        aggregator.aggregate(&runs, Some(&messages))?
    } else {
        aggregator.aggregate(&runs, None)?
    };
    Ok(table)
}

/// Builds report bodies for single runs.
#[derive(Clone)]
pub struct ReportBuilder {
    resolver: RunResolver,
    aggregator: PerfAggregator,
    default_branch: String,
    default_branch_limit: usize,
}

impl ReportBuilder {
    pub fn new(
        resolver: RunResolver,
        aggregator: PerfAggregator,
        default_branch: impl Into<String>,
        default_branch_limit: usize,
    ) -> Self {
        Self {
            resolver,
            aggregator,
            default_branch: default_branch.into(),
            default_branch_limit,
        }
    }

    /// Compose the report for `run`, or `None` when it has no perf data.
    pub async fn build(&self, run: &RunCommit) -> Result<Option<String>, PassError> {
        let table = self.aggregator.aggregate(slice::from_ref(run), None)?;
        if !table.has_benchmarks() {
            return Ok(None);
        }
        info!(commit = %run.commit_sha, "Generate comment");

        let mut lines = vec![REPORT_MARKER.to_string(), commit_line(&run.commit_sha)];
        lines.extend(to_markdown(table.rows())?);
        lines.push(String::new());
        lines.push(format!("{} branch:", self.default_branch));

        let reference = default_branch_table(
            &self.resolver,
            &self.aggregator,
            &self.default_branch,
            self.default_branch_limit,
            false,
        )
        .await?;
        lines.extend(to_markdown(reference.rows())?);

        Ok(Some(lines.join("\n")))
    }
}
