//! Tick cycle: the two-phase loop that drives the Tileworld simulation.
//!
//! Each tick runs through these phases:
//!
//! 1. **World** -- the environment advances one step: objects past their
//!    lifetime disappear and new ones are created.
//!
//! 2. **Broadcast** -- every agent, in fixed order, ages its memory, senses
//!    its window, and publishes MAP, GOALS, and AUCTION messages.
//!
//! 3. **Deliberate and act** -- every agent, in the same order, reads the
//!    channel, picks a mode and a step, and acts. Its outbox (the goals it
//!    just committed to) is published before the next agent thinks.
//!
//! The tick cycle is deterministic given the same seed and configuration.

use std::sync::Arc;

use serde::Serialize;
use tileworld_agents::{Agent, AgentConfig};
use tileworld_types::{ActionReport, AgentId, ObjectKind, Outbox, Topic};
use tileworld_world::{GridWorld, WorldError};
use tracing::{debug, info};

use crate::channel::TickChannel;
use crate::config::SimulationConfig;

/// Errors that can occur while building or running a tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The simulation has no agents to run.
    #[error("simulation has no agents")]
    NoAgents,
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Objects created by the world this tick.
    pub created: usize,
    /// Objects that expired this tick.
    pub expired: usize,
    /// MAP messages published.
    pub map_messages: usize,
    /// GOALS messages published.
    pub goal_messages: usize,
    /// AUCTION messages published, tiles and holes together.
    pub auction_messages: usize,
    /// One report per agent, in turn order.
    pub reports: Vec<ActionReport>,
    /// Actions the environment rejected.
    pub rejected: usize,
    /// Holes filled by all agents since the start of the run.
    pub total_score: u64,
}

/// Everything the tick cycle mutates.
#[derive(Debug)]
pub struct SimulationState {
    /// The environment.
    pub world: GridWorld,
    /// Agents in turn order.
    pub agents: Vec<Agent>,
    /// This tick's messages.
    pub channel: TickChannel,
}

impl SimulationState {
    /// Build the world, place the fuel station, and spawn agents on random
    /// empty cells.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::World`] if the map is invalid or no empty cell
    /// can be found for the station or an agent.
    pub fn new(config: &SimulationConfig) -> Result<Self, TickError> {
        let width = config.world.x_dimension;
        let height = config.world.y_dimension;
        let mut world = GridWorld::new(
            width,
            height,
            config.objects.clone(),
            config.agent.default_fuel_level,
            config.world.seed,
        )?;
        let station = world.place_fuel_station(config.world.fuel_station)?;

        let agent_config = Arc::new(config.agent.clone());
        let mut agents = Vec::new();
        for index in 0..config.world.agent_count {
            let position = world.random_empty_cell().ok_or(WorldError::NoEmptyCell)?;
            agents.push(Agent::new(
                AgentId::new(index),
                position,
                Arc::clone(&agent_config),
                width,
                height,
            ));
        }

        info!(
            name = %config.world.name,
            width,
            height,
            seed = config.world.seed,
            agents = agents.len(),
            station = %station,
            "Simulation state built"
        );
        Ok(Self::from_parts(world, agents))
    }

    /// Wrap an existing world and agents.
    pub const fn from_parts(world: GridWorld, agents: Vec<Agent>) -> Self {
        Self {
            world,
            agents,
            channel: TickChannel::new(),
        }
    }

    /// Holes filled by all agents so far.
    pub fn total_score(&self) -> u64 {
        self.agents
            .iter()
            .map(|a| u64::from(a.state().score))
            .fold(0, u64::saturating_add)
    }

    /// The shared agent configuration, if there are agents.
    pub fn agent_config(&self) -> Option<&AgentConfig> {
        self.agents.first().map(Agent::config)
    }
}

/// Execute one tick.
///
/// # Errors
///
/// Returns [`TickError::NoAgents`] if there is nobody to run.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    if state.agents.is_empty() {
        return Err(TickError::NoAgents);
    }

    // --- World ---
    let step = state.world.advance();
    let tick = step.tick;
    state.channel.clear();
    debug!(
        tick,
        created = step.created.len(),
        expired = step.expired,
        tiles = state.world.count(ObjectKind::Tile),
        holes = state.world.count(ObjectKind::Hole),
        "World advanced"
    );

    // --- Broadcast ---
    for agent in &mut state.agents {
        let mut outbox = Outbox::new(agent.id());
        agent.broadcast(&state.world, &mut outbox);
        state.channel.publish(outbox);
    }

    // --- Deliberate and act ---
    let mut reports = Vec::with_capacity(state.agents.len());
    for agent in &mut state.agents {
        let mut outbox = Outbox::new(agent.id());
        let thought = agent.think(&state.world, state.channel.messages(), &mut outbox);
        let report = agent.act(&mut state.world, thought);
        state.channel.publish(outbox);
        debug!(
            tick,
            agent = %report.agent_id,
            mode = %report.mode,
            goal = ?report.goal,
            position = %report.position,
            carried = report.carried,
            fuel = report.fuel,
            score = report.score,
            "Agent stepped"
        );
        reports.push(report);
    }

    let counts = state.channel.topic_counts();
    let count = |topic| counts.get(&topic).copied().unwrap_or(0);
    let rejected = reports.iter().filter(|r| r.outcome.is_rejected()).count();

    Ok(TickSummary {
        tick,
        created: step.created.len(),
        expired: step.expired,
        map_messages: count(Topic::Map),
        goal_messages: count(Topic::Goals),
        auction_messages: count(Topic::AuctionTile).saturating_add(count(Topic::AuctionHole)),
        reports,
        rejected,
        total_score: state.total_score(),
    })
}
