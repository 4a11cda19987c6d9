//! IPC robot
//!
//! Correlates CI workflow runs with local perf logs and reports IPC per
//! benchmark.
//!
//! # Usage
//!
//! ```bash
//! ipc-robot --token TOKEN [--output actions.csv] [--number 20]
//! ipc-robot --token TOKEN --always-on
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/ipc-robot/config.toml)
//! 3. Environment variables (IPC_ROBOT_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use ipc_robot::{build_context, export_csv, init_logging, load_settings, start_polling, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(&cli)?;
    init_logging(&settings.log_level)?;
    let ctx = build_context(settings)?;

    if cli.always_on {
        start_polling(ctx).await?;
    } else {
        export_csv(
            ctx.client,
            &ctx.aggregator,
            &ctx.settings,
            cli.number,
            &cli.output,
        )
        .await?;
    }

    Ok(())
}
