//! Continuous mode: publisher passes on a fixed interval.
//!
//! Recoverable pass failures are counted and logged, then the loop sleeps
//! as usual and tries again. A fatal failure ends the loop. Cancellation
//! (Ctrl+C) is observed both during a pass and during the sleep.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::publisher::Publisher;
use crate::PassError;

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub passes: u64,
    pub errors: u64,
}

pub struct Poller {
    publisher: Publisher,
    interval: Duration,
}

impl Poller {
    pub fn new(publisher: Publisher, interval: Duration) -> Self {
        Self {
            publisher,
            interval,
        }
    }

    /// Run passes until `cancel` fires or a pass fails fatally.
    pub async fn run(&self, cancel: CancellationToken) -> Result<PollStats, PassError> {
        let mut stats = PollStats::default();

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.publisher.run_pull_request_pass() => outcome,
            };
            stats.passes += 1;

            match outcome {
                Ok(summary) => info!(
                    inspected = summary.inspected,
                    posted = summary.posted,
                    already_reported = summary.already_reported,
                    no_perf_data = summary.no_perf_data,
                    "Pass complete"
                ),
                Err(err) if err.is_recoverable() => {
                    stats.errors += 1;
                    error!(error = %err, error_count = stats.errors, "ERROR during pass");
                }
                Err(err) => {
                    error!(error = %err, "Fatal error, stopping");
                    return Err(err);
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(passes = stats.passes, errors = stats.errors, "Polling stopped");
        Ok(stats)
    }
}
