//! Commit x benchmark aggregation.
//!
//! Each run owns a directory `<perf dir>/<run id>/` holding one
//! `<benchmark>.log` per benchmark. A missing directory means the data has
//! not been produced yet: the commit is left out of the table entirely.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use ipc_types::{short_sha, RunCommit};

use crate::counters::{CounterSource, PerfCounters};
use crate::metrics::MetricRegistry;
use crate::PerfError;

/// First column of every table.
pub const COMMIT_COLUMN: &str = "commit";

/// Optional second column carrying the commit message.
pub const MESSAGE_COLUMN: &str = "message";

/// Dense table produced by the aggregator: header row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfTable {
    rows: Vec<Vec<String>>,
}

impl PerfTable {
    fn new(header: Vec<String>, data: Vec<Vec<String>>) -> Self {
        let mut rows = Vec::with_capacity(data.len() + 1);
        rows.push(header);
        rows.extend(data);
        Self { rows }
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    /// All rows, header included.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        &self.rows[1..]
    }

    /// Benchmark columns in header order.
    pub fn benchmarks(&self) -> impl Iterator<Item = &str> {
        self.header()
            .iter()
            .map(String::as_str)
            .filter(|c| *c != COMMIT_COLUMN && *c != MESSAGE_COLUMN)
    }

    pub fn has_benchmarks(&self) -> bool {
        self.benchmarks().next().is_some()
    }

    /// True when no commit contributed a row.
    pub fn is_empty(&self) -> bool {
        self.rows.len() == 1
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

/// Builds result tables from run directories.
#[derive(Debug, Clone)]
pub struct PerfAggregator {
    perf_dir: PathBuf,
    log_suffix: String,
    registry: Arc<MetricRegistry>,
    report_metric: String,
}

impl PerfAggregator {
    /// Create an aggregator reporting `report_metric` from `registry`.
    pub fn new(
        perf_dir: impl Into<PathBuf>,
        registry: Arc<MetricRegistry>,
        report_metric: impl Into<String>,
    ) -> Result<Self, PerfError> {
        let report_metric = report_metric.into();
        if !registry.contains(&report_metric) {
            return Err(PerfError::UnknownMetric(report_metric));
        }

        Ok(Self {
            perf_dir: perf_dir.into(),
            log_suffix: ".log".to_string(),
            registry,
            report_metric,
        })
    }

    /// Use a different log file suffix (default `.log`).
    pub fn with_log_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.log_suffix = suffix.into();
        self
    }

    pub fn perf_dir(&self) -> &Path {
        &self.perf_dir
    }

    /// Directory holding the logs of one run.
    pub fn run_dir(&self, run_id: u64) -> PathBuf {
        self.perf_dir.join(run_id.to_string())
    }

    /// Build the commit x benchmark table for `runs`, in input order.
    ///
    /// With `messages`, a `message` column is placed before the benchmarks.
    /// A commit appearing twice keeps its first position and its last data.
    pub fn aggregate(
        &self,
        runs: &[RunCommit],
        messages: Option<&HashMap<String, String>>,
    ) -> Result<PerfTable, PerfError> {
        let mut order: Vec<&str> = Vec::new();
        let mut results: HashMap<&str, BTreeMap<String, String>> = HashMap::new();
        let mut benchmarks: BTreeSet<String> = BTreeSet::new();

        for run in runs {
            let run_dir = self.run_dir(run.run_id);
            if !run_dir.is_dir() {
                info!(
                    commit = %run.commit_sha,
                    path = %run_dir.display(),
                    "perf data not found. Skip."
                );
                continue;
            }
            info!(commit = %run.commit_sha, path = %run_dir.display(), "Loading perf data");

            let mut cells = self.load_run(&run_dir)?;
            benchmarks.extend(cells.keys().cloned());

            if let Some(messages) = messages {
                if let Some(message) = messages.get(&run.commit_sha) {
                    cells.insert(MESSAGE_COLUMN.to_string(), message.clone());
                }
            }

            if results.insert(run.commit_sha.as_str(), cells).is_none() {
                order.push(run.commit_sha.as_str());
            }
        }

        let mut columns: Vec<String> = Vec::with_capacity(benchmarks.len() + 1);
        if messages.is_some() {
            columns.push(MESSAGE_COLUMN.to_string());
        }
        columns.extend(benchmarks);

        let mut header = vec![COMMIT_COLUMN.to_string()];
        header.extend(columns.iter().cloned());

        let data = order
            .into_iter()
            .map(|commit| {
                let cells = &results[commit];
                let mut row = vec![short_sha(commit).to_string()];
                row.extend(
                    columns
                        .iter()
                        .map(|column| cells.get(column).cloned().unwrap_or_default()),
                );
                row
            })
            .collect();

        Ok(PerfTable::new(header, data))
    }

    /// Formatted metric value per benchmark found in `run_dir`.
    fn load_run(&self, run_dir: &Path) -> Result<BTreeMap<String, String>, PerfError> {
        let io_err = |source| PerfError::Io {
            path: run_dir.to_path_buf(),
            source,
        };

        let mut logs: Vec<(String, PathBuf)> = Vec::new();
        for entry in fs::read_dir(run_dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match file_name.strip_suffix(self.log_suffix.as_str()) {
                Some(benchmark) if !benchmark.is_empty() => {
                    logs.push((benchmark.to_string(), path.clone()));
                }
                _ => debug!(path = %path.display(), "Ignoring non-log file"),
            }
        }
        logs.sort();

        let mut cells = BTreeMap::new();
        for (benchmark, path) in logs {
            let value = self.evaluate_log(&path).map_err(|source| PerfError::LogFile {
                path: path.clone(),
                source: Box::new(source),
            })?;
            cells.insert(benchmark, format!("{value:.3}"));
        }
        Ok(cells)
    }

    fn evaluate_log(&self, path: &Path) -> Result<f64, PerfError> {
        let counters = PerfCounters::open(path)?.with_metrics(&self.registry)?;
        counters
            .counter(&self.report_metric)
            .ok_or_else(|| PerfError::UnknownMetric(self.report_metric.clone()))
    }
}
