//! Counter sources over perf logs.
//!
//! A simulation log carries one line per counter:
//!
//! ```text
//! [PERF ][time=       12000] TOP.SimTop.l_soc.core_with_l2.core.ctrlBlock.rob: clock_cycle,    12000
//! ```
//!
//! Each counter is keyed by `<module path>.<counter name>`. Lookups accept
//! either the full key or a bare counter name, which resolves to the first
//! key in file order ending with `.<name>`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::metrics::MetricRegistry;
use crate::PerfError;

const PERF_TAG: &str = "[PERF ]";

/// Keyed access to named numeric counters.
pub trait CounterSource {
    /// Value of the named counter, if present.
    fn counter(&self, name: &str) -> Option<f64>;
}

impl CounterSource for HashMap<String, f64> {
    fn counter(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

/// Counters parsed from one perf log file.
#[derive(Debug, Clone, Default)]
pub struct PerfCounters {
    source: Option<PathBuf>,
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl PerfCounters {
    /// Read and parse a perf log file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PerfError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PerfError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut counters = Self::parse(&text);
        counters.source = Some(path.to_path_buf());
        debug!(path = %path.display(), counters = counters.len(), "Loaded perf log");
        Ok(counters)
    }

    /// Parse perf log text. Lines that are not counter lines are skipped.
    pub fn parse(text: &str) -> Self {
        let mut counters = Self::default();
        for line in text.lines() {
            if let Some((key, value)) = parse_line(line) {
                counters.insert(key, value);
            }
        }
        counters
    }

    /// Set a counter, overwriting an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Copy of these counters with every registered metric added under its own name.
    ///
    /// Metrics are evaluated in registry order, so a metric may use one
    /// defined before it.
    pub fn with_metrics(&self, registry: &MetricRegistry) -> Result<Self, PerfError> {
        let mut derived = self.clone();
        for metric in registry.iter() {
            let value = metric.evaluate(&derived)?;
            derived.insert(metric.name(), value);
        }
        Ok(derived)
    }

    /// File these counters were read from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fully-qualified counter keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl CounterSource for PerfCounters {
    fn counter(&self, name: &str) -> Option<f64> {
        if let Some(&slot) = self.index.get(name) {
            return Some(self.entries[slot].1);
        }
        self.entries
            .iter()
            .find(|(key, _)| {
                key.len() > name.len()
                    && key.ends_with(name)
                    && key[..key.len() - name.len()].ends_with('.')
            })
            .map(|(_, value)| *value)
    }
}

/// Split a counter line into its key and value.
fn parse_line(line: &str) -> Option<(String, f64)> {
    let start = line.find(PERF_TAG)?;
    let mut rest = &line[start + PERF_TAG.len()..];

    if rest.starts_with("[time=") {
        let end = rest.find(']')?;
        rest = &rest[end + 1..];
    }

    let (path, counter) = rest.trim_start().split_once(": ")?;
    let (name, value) = counter.rsplit_once(',')?;
    let name = name.trim();
    if path.is_empty() || name.is_empty() || path.contains(char::is_whitespace) {
        return None;
    }

    let value: u64 = value.trim().parse().ok()?;
    Some((format!("{path}.{name}"), value as f64))
}
