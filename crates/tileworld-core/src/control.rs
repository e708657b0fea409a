//! Shared run control for the tick loop.
//!
//! [`RunControl`] is wrapped in an [`Arc`](std::sync::Arc) and shared between
//! the tick loop and whatever wants to stop it (the engine's Ctrl-C handler,
//! tests). The stop flag is atomic so the loop never takes a lock.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reason why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Reached the configured `end_time`.
    EndTimeReached,
    /// A stop was requested before `end_time`.
    Interrupted,
}

/// Shared control state for one run.
#[derive(Debug)]
pub struct RunControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Tick interval in milliseconds.
    tick_interval_ms: u64,

    /// Last tick to execute.
    end_time: u64,

    /// Wall-clock time when the control was created.
    started_at: DateTime<Utc>,
}

impl RunControl {
    /// Control a run of `end_time` ticks paced at `tick_interval_ms`.
    pub fn new(end_time: u64, tick_interval_ms: u64) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            tick_interval_ms,
            end_time,
            started_at: Utc::now(),
        }
    }

    /// Request a clean stop after the current tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Milliseconds to sleep between ticks.
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Last tick to execute.
    pub const fn end_time(&self) -> u64 {
        self.end_time
    }

    /// Whether `tick` is the last one.
    pub const fn end_time_reached(&self, tick: u64) -> bool {
        tick >= self.end_time
    }

    /// When the run started.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock seconds since the run started.
    pub fn elapsed_seconds(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}
