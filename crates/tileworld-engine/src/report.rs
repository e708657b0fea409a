//! The end-of-run report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tileworld_core::config::SimulationConfig;
use tileworld_core::runner::RunSummary;
use tileworld_types::RunId;

/// Everything worth keeping about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique identifier of the run.
    pub run_id: RunId,
    /// Configured simulation name.
    pub name: String,
    /// Random seed.
    pub seed: u64,
    /// Map width and height.
    pub dimensions: (u32, u32),
    /// Number of agents.
    pub agent_count: u32,
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end.
    pub finished_at: DateTime<Utc>,
    /// Scores, standings, and the last tick.
    pub summary: RunSummary,
}

impl RunReport {
    /// Assemble a report for a run that started at `started_at`.
    pub fn new(
        run_id: RunId,
        config: &SimulationConfig,
        started_at: DateTime<Utc>,
        summary: RunSummary,
    ) -> Self {
        Self {
            run_id,
            name: config.world.name.clone(),
            seed: config.world.seed,
            dimensions: (config.world.x_dimension, config.world.y_dimension),
            agent_count: config.world.agent_count,
            started_at,
            finished_at: Utc::now(),
            summary,
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
