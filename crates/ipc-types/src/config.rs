//! Configuration loading for the IPC robot.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `<config dir>/ipc-robot/config.toml`.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::error::IpcError;

/// Which run identifier names a run's perf log directory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunKey {
    /// The per-workflow sequential run number (default, used by the perf CI)
    #[default]
    Number,
    /// The globally unique workflow run id
    Id,
}

/// Where perf logs live and which metric ends up in the tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfSettings {
    /// Base directory holding one subdirectory per run
    #[serde(default = "default_perf_dir")]
    pub dir: String,

    /// Suffix of per-benchmark log files
    #[serde(default = "default_log_suffix")]
    pub log_suffix: String,

    /// Derived metric written into each table cell
    #[serde(default = "default_report_metric")]
    pub report_metric: String,

    /// Run identifier used as the directory name
    #[serde(default)]
    pub run_key: RunKey,
}

fn default_perf_dir() -> String {
    "/bigdata/xs-perf".to_string()
}

fn default_log_suffix() -> String {
    ".log".to_string()
}

fn default_report_metric() -> String {
    "global.IPC".to_string()
}

impl Default for PerfSettings {
    fn default() -> Self {
        Self {
            dir: default_perf_dir(),
            log_suffix: default_log_suffix(),
            report_metric: default_report_metric(),
            run_key: RunKey::default(),
        }
    }
}

/// Publisher loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotSettings {
    /// Branch whose recent runs form the reference table
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Number of pull-request runs inspected per pass
    #[serde(default = "default_pull_request_limit")]
    pub pull_request_limit: usize,

    /// Number of default-branch runs in the reference table
    #[serde(default = "default_branch_limit")]
    pub default_branch_limit: usize,

    /// Sleep between passes in continuous mode
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_pull_request_limit() -> usize {
    15
}

fn default_branch_limit() -> usize {
    10
}

fn default_poll_interval_secs() -> u64 {
    300
}

impl Default for RobotSettings {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            pull_request_limit: default_pull_request_limit(),
            default_branch_limit: default_branch_limit(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Owner of the monitored repository
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    /// Name of the monitored repository
    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    /// REST API root
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// API token (prefer IPC_ROBOT_TOKEN or --token over the config file)
    #[serde(default)]
    pub token: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub perf: PerfSettings,

    #[serde(default)]
    pub robot: RobotSettings,
}

fn default_repo_owner() -> String {
    "OpenXiangShan".to_string()
}

fn default_repo_name() -> String {
    "XiangShan".to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
            api_base_url: default_api_base_url(),
            token: None,
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
            perf: PerfSettings::default(),
            robot: RobotSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (`<config dir>/ipc-robot/config.toml`)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (`IPC_ROBOT_*`, nested keys joined with `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, IpcError> {
        let config_dir = ProjectDirs::from("", "", "ipc-robot")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("repo_owner", default_repo_owner())?
            .set_default("repo_name", default_repo_name())?
            .set_default("api_base_url", default_api_base_url())?
            .set_default("request_timeout_secs", default_request_timeout_secs() as i64)?
            .set_default("log_level", default_log_level())?
            .set_default("perf.dir", default_perf_dir())?
            .set_default("perf.log_suffix", default_log_suffix())?
            .set_default("perf.report_metric", default_report_metric())?
            .set_default("robot.default_branch", default_branch())?
            .set_default("robot.pull_request_limit", default_pull_request_limit() as i64)?
            .set_default("robot.default_branch_limit", default_branch_limit() as i64)?
            .set_default("robot.poll_interval_secs", default_poll_interval_secs() as i64)?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // IPC_ROBOT_TOKEN, IPC_ROBOT_PERF__DIR, IPC_ROBOT_ROBOT__POLL_INTERVAL_SECS, ...
        builder = builder.add_source(
            Environment::with_prefix("IPC_ROBOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make a pass meaningless.
    pub fn validate(&self) -> Result<(), IpcError> {
        if self.repo_owner.is_empty() || self.repo_name.is_empty() {
            return Err(IpcError::Config(
                "repo_owner and repo_name must be set".to_string(),
            ));
        }
        if self.robot.pull_request_limit == 0 {
            return Err(IpcError::Config(
                "robot.pull_request_limit must be > 0".to_string(),
            ));
        }
        if self.perf.log_suffix.is_empty() {
            return Err(IpcError::Config("perf.log_suffix must not be empty".to_string()));
        }
        Ok(())
    }

    /// `owner/name` of the monitored repository.
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.repo_owner, self.repo_name)
    }

    /// Browser URL of a pull request, for log lines.
    pub fn pull_request_url(&self, number: u64) -> String {
        format!(
            "https://github.com/{}/{}/pull/{}",
            self.repo_owner, self.repo_name, number
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.robot.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Expand ~ in the perf directory to the actual home directory
    pub fn expanded_perf_dir(&self) -> PathBuf {
        if let Some(rest) = self.perf.dir.strip_prefix("~/") {
            if let Some(dirs) = BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        PathBuf::from(&self.perf.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.repo_slug(), "OpenXiangShan/XiangShan");
        assert_eq!(settings.perf.dir, "/bigdata/xs-perf");
        assert_eq!(settings.perf.run_key, RunKey::Number);
        assert_eq!(settings.robot.pull_request_limit, 15);
        assert_eq!(settings.robot.default_branch_limit, 10);
        assert_eq!(settings.poll_interval(), Duration::from_secs(300));
        assert!(settings.token.is_none());
    }

    #[test]
    fn test_load_with_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.robot.default_branch, "master");
        assert_eq!(settings.perf.log_suffix, ".log");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("robot.toml");
        std::fs::write(
            &path,
            "repo_owner = \"me\"\n[perf]\ndir = \"/tmp/perf\"\nrun_key = \"id\"\n[robot]\npoll_interval_secs = 60\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.repo_owner, "me");
        assert_eq!(settings.repo_name, "XiangShan");
        assert_eq!(settings.perf.dir, "/tmp/perf");
        assert_eq!(settings.perf.run_key, RunKey::Id);
        assert_eq!(settings.poll_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_missing_cli_config_file_fails() {
        let result = Settings::load(Some("/nonexistent/ipc-robot.toml"));
        assert!(matches!(result, Err(IpcError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.robot.pull_request_limit = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_pull_request_url() {
        let settings = Settings::default();
        assert_eq!(
            settings.pull_request_url(42),
            "https://github.com/OpenXiangShan/XiangShan/pull/42"
        );
    }

    #[test]
    fn test_expanded_perf_dir_absolute() {
        let settings = Settings::default();
        assert_eq!(settings.expanded_perf_dir(), PathBuf::from("/bigdata/xs-perf"));
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let decoded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.perf.report_metric, "global.IPC");
        assert_eq!(decoded.robot.poll_interval_secs, 300);
    }
}
