//! Derived metric definitions.
//!
//! A metric combines named raw counters positionally. The registry is an
//! immutable, ordered table built once at startup and shared by reference.

use std::fmt;

use crate::counters::CounterSource;
use crate::PerfError;

/// Instructions per cycle across the whole core.
pub const IPC_METRIC: &str = "global.IPC";

/// Combines counter values, given in declaration order.
pub type Combinator = fn(&[f64]) -> f64;

/// A named value computed from raw counters.
#[derive(Clone)]
pub struct MetricDefinition {
    name: String,
    counters: Vec<String>,
    combinator: Combinator,
}

impl MetricDefinition {
    /// Declare a metric over the given counters.
    pub fn define<I, S>(name: impl Into<String>, counters: I, combinator: Combinator) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            counters: counters.into_iter().map(Into::into).collect(),
            combinator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required counter names in the order the combinator receives them.
    pub fn counters(&self) -> &[String] {
        &self.counters
    }

    /// Look up every required counter and apply the combinator.
    pub fn evaluate(&self, source: &dyn CounterSource) -> Result<f64, PerfError> {
        let values = self
            .counters
            .iter()
            .map(|counter| {
                source
                    .counter(counter)
                    .ok_or_else(|| PerfError::MissingCounter {
                        metric: self.name.clone(),
                        counter: counter.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let value = (self.combinator)(&values);
        if !value.is_finite() {
            return Err(PerfError::NonFiniteMetric {
                metric: self.name.clone(),
                value,
            });
        }
        Ok(value)
    }
}

impl fmt::Debug for MetricDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricDefinition")
            .field("name", &self.name)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

/// Evaluate `definition` against `source`.
pub fn evaluate(definition: &MetricDefinition, source: &dyn CounterSource) -> Result<f64, PerfError> {
    definition.evaluate(source)
}

fn ipc(values: &[f64]) -> f64 {
    let (cycles, instrs) = (values[0], values[1]);
    instrs / cycles
}

/// Ordered set of metric definitions.
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    metrics: Vec<MetricDefinition>,
}

impl MetricRegistry {
    pub fn new(metrics: Vec<MetricDefinition>) -> Self {
        Self { metrics }
    }

    /// The metrics reported by the robot: currently IPC only.
    pub fn standard() -> Self {
        Self::new(vec![MetricDefinition::define(
            IPC_METRIC,
            ["clock_cycle", "commitInstr"],
            ipc,
        )])
    }

    pub fn get(&self, name: &str) -> Option<&MetricDefinition> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
