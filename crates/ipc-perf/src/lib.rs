//! Perf data layer for the IPC robot.
//!
//! Provides:
//! - Counter sources over XiangShan perf logs (`counters`)
//! - Derived metric definitions such as IPC (`metrics`)
//! - The commit x benchmark aggregator (`aggregate`)
//! - Markdown and CSV rendering of result tables (`table`)

pub mod aggregate;
pub mod counters;
pub mod error;
pub mod metrics;
pub mod table;

pub use aggregate::{PerfAggregator, PerfTable, COMMIT_COLUMN, MESSAGE_COLUMN};
pub use counters::{CounterSource, PerfCounters};
pub use error::PerfError;
pub use metrics::{evaluate, Combinator, MetricDefinition, MetricRegistry, IPC_METRIC};
pub use table::{read_csv, to_csv, to_markdown, ALIGN_MARKER};
