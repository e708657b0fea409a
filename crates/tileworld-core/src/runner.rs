//! Simulation loop runner.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives the tick loop with support for:
//!
//! - **Bounded simulation**: stop once `end_time` ticks have run
//! - **Pacing**: sleep `tick_interval_ms` between ticks
//! - **Clean shutdown**: a stop request ends the run after the current tick
//!
//! The runner wraps the single-tick [`run_tick`] function and adds the
//! control plane around it. Ticks themselves are synchronous.
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;

use serde::Serialize;
use tileworld_types::AgentId;
use tracing::{info, warn};

use crate::control::{EndReason, RunControl};
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// One agent's standing at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentStanding {
    /// The agent.
    pub agent_id: AgentId,
    /// Holes filled.
    pub score: u32,
    /// Fuel left.
    pub fuel: u32,
    /// Tiles still in hand.
    pub carried: u32,
}

/// Result of the simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// The reason the run ended.
    pub end_reason: EndReason,
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// Holes filled by all agents.
    pub total_score: u64,
    /// Actions the environment rejected over the whole run.
    pub rejected_actions: u64,
    /// Per-agent results, in turn order.
    pub agents: Vec<AgentStanding>,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to print progress or collect statistics.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the simulation loop until `end_time` or a stop request.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails.
pub async fn run_simulation(
    state: &mut SimulationState,
    control: &Arc<RunControl>,
    callback: &mut dyn TickCallback,
) -> Result<RunSummary, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut rejected_actions: u64 = 0;

    info!(
        end_time = control.end_time(),
        tick_interval_ms = control.tick_interval_ms(),
        agents = state.agents.len(),
        "Simulation starting"
    );

    let end_reason = loop {
        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!(total_ticks, "Stop requested");
            break EndReason::Interrupted;
        }
        if control.end_time_reached(total_ticks) {
            info!(total_ticks, "End time reached");
            break EndReason::EndTimeReached;
        }

        // --- Execute tick ---
        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);
        rejected_actions =
            rejected_actions.saturating_add(u64::try_from(summary.rejected).unwrap_or(u64::MAX));

        // --- Notify callback ---
        callback.on_tick(&summary, state);
        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    };

    let agents = state
        .agents
        .iter()
        .map(|agent| AgentStanding {
            agent_id: agent.id(),
            score: agent.state().score,
            fuel: agent.state().fuel,
            carried: agent.state().carried,
        })
        .collect();

    Ok(RunSummary {
        end_reason,
        total_ticks,
        total_score: state.total_score(),
        rejected_actions,
        agents,
        final_summary: last_summary,
    })
}

/// Log the end of a run.
pub fn log_simulation_end(result: &RunSummary) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        total_score = result.total_score,
        rejected_actions = result.rejected_actions,
        "Simulation ended"
    );
    for standing in &result.agents {
        info!(
            agent = %standing.agent_id,
            score = standing.score,
            fuel = standing.fuel,
            carried = standing.carried,
            "Final standing"
        );
    }
    if result.final_summary.is_none() {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{SimulationConfig, WorldConfig};

    fn make_simulation_state() -> SimulationState {
        let config = SimulationConfig {
            world: WorldConfig {
                x_dimension: 20,
                y_dimension: 20,
                agent_count: 2,
                seed: 3,
                ..WorldConfig::default()
            },
            ..SimulationConfig::default()
        };
        SimulationState::new(&config).unwrap()
    }

    #[tokio::test]
    async fn bounded_by_end_time() {
        let mut state = make_simulation_state();
        let control = Arc::new(RunControl::new(5, 0));
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &control, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, EndReason::EndTimeReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.map(|s| s.tick), Some(5));
        assert_eq!(result.agents.len(), 2);
    }

    #[tokio::test]
    async fn stop_before_first_tick() {
        let mut state = make_simulation_state();
        let control = Arc::new(RunControl::new(100, 0));
        control.request_stop();
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &control, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, EndReason::Interrupted);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn tick_callback_is_called() {
        struct CountCallback {
            count: u64,
        }
        impl TickCallback for CountCallback {
            fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {
                self.count = self.count.saturating_add(1);
            }
        }

        let mut state = make_simulation_state();
        let control = Arc::new(RunControl::new(3, 0));
        let mut cb = CountCallback { count: 0 };

        let _ = run_simulation(&mut state, &control, &mut cb).await.unwrap();

        assert_eq!(cb.count, 3);
    }

    #[tokio::test]
    async fn callback_can_stop_the_run() {
        struct StopAt {
            tick: u64,
            control: Arc<RunControl>,
        }
        impl TickCallback for StopAt {
            fn on_tick(&mut self, summary: &TickSummary, _state: &SimulationState) {
                if summary.tick >= self.tick {
                    self.control.request_stop();
                }
            }
        }

        let mut state = make_simulation_state();
        let control = Arc::new(RunControl::new(100, 0));
        let mut cb = StopAt {
            tick: 4,
            control: Arc::clone(&control),
        };

        let result = run_simulation(&mut state, &control, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, EndReason::Interrupted);
        assert_eq!(result.total_ticks, 4);
    }
}
