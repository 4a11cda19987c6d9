//! Command implementations for the IPC robot.
//!
//! Handles:
//! - always-on: poll pull-request runs and post reports until interrupted
//! - export: write the default branch's recent IPC history to CSV

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use secrecy::SecretString;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use ipc_github::{CiService, GithubClient, GithubConfig, RunResolver};
use ipc_perf::{to_csv, MetricRegistry, PerfAggregator};
use ipc_types::Settings;

use crate::cli::Cli;
use crate::poller::{PollStats, Poller};
use crate::publisher::Publisher;
use crate::report::default_branch_table;

/// Everything a command needs, built once at startup.
pub struct RobotContext {
    pub settings: Settings,
    pub client: Arc<dyn CiService>,
    pub aggregator: PerfAggregator,
}

/// Load configuration (defaults -> file -> env -> CLI).
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }
    if let Some(token) = &cli.token {
        settings.token = Some(token.clone());
    }
    Ok(settings)
}

/// Initialize logging to stdout; RUST_LOG overrides the configured level.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Build the metric registry, aggregator and CI client.
///
/// A missing token is a configuration error: nothing remote is attempted.
pub fn build_context(settings: Settings) -> Result<RobotContext> {
    let token = settings
        .token
        .clone()
        .filter(|t| !t.trim().is_empty())
        .context("A GitHub token is required: pass --token or set IPC_ROBOT_TOKEN")?;

    let registry = Arc::new(MetricRegistry::standard());
    let aggregator = PerfAggregator::new(
        settings.expanded_perf_dir(),
        registry,
        settings.perf.report_metric.clone(),
    )
    .context("Invalid perf configuration")?
    .with_log_suffix(settings.perf.log_suffix.clone());

    let config = GithubConfig::from_settings(&settings, SecretString::from(token));
    let client = GithubClient::new(config).context("Failed to create GitHub client")?;

    Ok(RobotContext {
        settings,
        client: Arc::new(client),
        aggregator,
    })
}

/// Check pull requests every poll interval until Ctrl+C.
pub async fn start_polling(ctx: RobotContext) -> Result<PollStats> {
    info!("IPC robot starting...");
    info!("  Repository: {}", ctx.settings.repo_slug());
    info!("  Perf directory: {}", ctx.aggregator.perf_dir().display());
    info!("  Poll interval: {:?}", ctx.settings.poll_interval());

    let publisher = Publisher::new(ctx.client, ctx.aggregator, &ctx.settings);
    let poller = Poller::new(publisher, ctx.settings.poll_interval());

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down...");
            signal_token.cancel();
        }
    });

    poller
        .run(cancel)
        .await
        .context("Polling stopped on a fatal error")
}

/// Write the `limit` most recent default-branch commits, with messages, to `output`.
pub async fn export_csv(
    client: Arc<dyn CiService>,
    aggregator: &PerfAggregator,
    settings: &Settings,
    limit: usize,
    output: &Path,
) -> Result<usize> {
    let resolver = RunResolver::new(client, settings.perf.run_key);
    let table = default_branch_table(
        &resolver,
        aggregator,
        &settings.robot.default_branch,
        limit,
        true,
    )
    .await?;

    to_csv(table.rows(), output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let commits = table.data_rows().len();
    info!(path = %output.display(), commits, "Wrote CSV");
    Ok(commits)
}
