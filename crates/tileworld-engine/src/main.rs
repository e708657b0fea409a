//! Engine binary for the Tileworld simulation.
//!
//! This is the main entry point that wires together configuration, the
//! world, the agents, and the run loop, then prints a JSON report.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `tileworld-config.yaml` (or `TILEWORLD_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the world, place the fuel station, spawn agents
//! 4. Install the Ctrl-C handler
//! 5. Run the simulation loop
//! 6. Log the result and print the report

mod error;
mod progress;
mod report;

use std::sync::Arc;

use anyhow::Context as _;
use tileworld_core::config::{self, LogFormat, LoggingConfig, SimulationConfig};
use tileworld_core::control::RunControl;
use tileworld_core::runner;
use tileworld_core::tick::SimulationState;
use tileworld_types::RunId;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;
use crate::report::RunReport;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, setup, or the run itself fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = config::config_path();
    let config = SimulationConfig::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?;

    init_logging(&config.logging);
    info!(
        path = %path.display(),
        found = path.exists(),
        world_name = config.world.name,
        seed = config.world.seed,
        width = config.world.x_dimension,
        height = config.world.y_dimension,
        agents = config.world.agent_count,
        end_time = config.world.end_time,
        "Configuration loaded"
    );

    let report = run(&config).await.context("simulation failed")?;
    println!("{}", report.to_json()?);
    Ok(())
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Build the simulation, run it to completion, and assemble the report.
async fn run(config: &SimulationConfig) -> Result<RunReport, EngineError> {
    let run_id = RunId::new();
    info!(%run_id, "tileworld-engine starting");

    let mut state = SimulationState::new(config)?;

    let control = Arc::new(RunControl::new(
        config.world.end_time,
        config.world.tick_interval_ms,
    ));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    warn!("Ctrl-C received, stopping after the current tick");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    let mut callback = ProgressCallback::for_run(config.world.end_time);
    let summary = runner::run_simulation(&mut state, &control, &mut callback).await?;
    runner::log_simulation_end(&summary);

    info!(
        %run_id,
        end_reason = ?summary.end_reason,
        total_ticks = summary.total_ticks,
        elapsed_seconds = control.elapsed_seconds(),
        "tileworld-engine shutdown complete"
    );
    Ok(RunReport::new(run_id, config, control.started_at(), summary))
}
