//! CLI argument parsing for the IPC robot.
//!
//! CLI flags override all other config sources.

use std::path::PathBuf;

use clap::Parser;

/// IPC robot
///
/// Reports per-benchmark IPC on pull requests (--always-on) or exports the
/// default branch's recent IPC history to CSV.
#[derive(Parser, Debug)]
#[command(name = "ipc-robot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides the default config location)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// GitHub token (falls back to the `token` setting / IPC_ROBOT_TOKEN)
    #[arg(short, long)]
    pub token: Option<String>,

    /// Output CSV file for one-shot export
    #[arg(short, long, default_value = "actions.csv")]
    pub output: PathBuf,

    /// Number of default-branch commits to export
    #[arg(short, long, default_value_t = 20)]
    pub number: usize,

    /// Keep checking pull requests instead of exporting once
    #[arg(short, long)]
    pub always_on: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ipc-robot"]);
        assert_eq!(cli.output, PathBuf::from("actions.csv"));
        assert_eq!(cli.number, 20);
        assert!(!cli.always_on);
        assert!(cli.token.is_none());
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from([
            "ipc-robot", "-t", "ghp_x", "-o", "out.csv", "-n", "5", "-a", "-l", "debug",
        ]);
        assert_eq!(cli.token.as_deref(), Some("ghp_x"));
        assert_eq!(cli.output, PathBuf::from("out.csv"));
        assert_eq!(cli.number, 5);
        assert!(cli.always_on);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_long_flags() {
        let cli = Cli::parse_from([
            "ipc-robot",
            "--token",
            "ghp_y",
            "--always-on",
            "--config",
            "/etc/ipc-robot.toml",
        ]);
        assert_eq!(cli.token.as_deref(), Some("ghp_y"));
        assert!(cli.always_on);
        assert_eq!(cli.config.as_deref(), Some("/etc/ipc-robot.toml"));
    }

    #[test]
    fn test_invalid_number() {
        assert!(Cli::try_parse_from(["ipc-robot", "-n", "many"]).is_err());
    }
}
