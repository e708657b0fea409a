//! Tick callback that logs run progress.
//!
//! Every `every` ticks the callback logs the running score and how many
//! agents are in each mode. Per-agent step lines are logged by the tick
//! cycle itself at `debug`.

use std::collections::BTreeMap;

use tileworld_core::runner::TickCallback;
use tileworld_core::tick::{SimulationState, TickSummary};
use tileworld_types::Mode;
use tracing::info;

/// Callback that logs a progress line at a fixed tick interval.
pub struct ProgressCallback {
    every: u64,
    rejected: u64,
}

impl ProgressCallback {
    /// Log every `every` ticks. An interval of 0 is treated as 1.
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            rejected: 0,
        }
    }

    /// A tenth of the run, so a full run logs about ten lines.
    pub fn for_run(end_time: u64) -> Self {
        Self::new(end_time.checked_div(10).unwrap_or(1))
    }
}

impl TickCallback for ProgressCallback {
    fn on_tick(&mut self, summary: &TickSummary, _state: &SimulationState) {
        self.rejected = self
            .rejected
            .saturating_add(u64::try_from(summary.rejected).unwrap_or(u64::MAX));
        if summary.tick.checked_rem(self.every) != Some(0) {
            return;
        }
        let mut modes: BTreeMap<Mode, usize> = BTreeMap::new();
        for report in &summary.reports {
            let count = modes.entry(report.mode).or_default();
            *count = count.saturating_add(1);
        }
        let modes: Vec<String> = modes
            .iter()
            .map(|(mode, count)| format!("{mode}={count}"))
            .collect();
        info!(
            tick = summary.tick,
            total_score = summary.total_score,
            rejected = self.rejected,
            goals = summary.goal_messages,
            auctions = summary.auction_messages,
            modes = %modes.join(","),
            "Progress"
        );
    }
}
