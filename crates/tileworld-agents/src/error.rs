//! Error types for the tileworld-agents crate.
//!
//! Nothing in this crate is fatal to a run. Action failures are turned into
//! rejected [`ActionOutcome`]s and missing zone data is logged; the next
//! tick re-evaluates from scratch.
//!
//! [`ActionOutcome`]: tileworld_types::ActionOutcome

use tileworld_types::AgentId;
use tileworld_world::WorldError;

/// Errors that can occur while an agent deliberates or acts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// The agent's own MAP broadcast is missing from the tick channel, so
    /// its place in the zone assignment is unknown.
    #[error("no zone available for {agent}: own position not broadcast")]
    ZoneUnavailable {
        /// The agent that could not be placed.
        agent: AgentId,
    },

    /// The map is too narrow to give every agent its own band.
    #[error("cannot split an extent of {extent} cells between {agents} agents")]
    TooManyAgents {
        /// Number of agents to place.
        agents: usize,
        /// Cells along the split axis.
        extent: u32,
    },

    /// A pickup was attempted with a full load.
    #[error("carry capacity of {capacity} reached")]
    CarryCapacityReached {
        /// The configured capacity.
        capacity: u32,
    },

    /// A putdown was attempted without a tile.
    #[error("not carrying a tile")]
    NothingCarried,

    /// A move was attempted with an empty tank.
    #[error("out of fuel")]
    OutOfFuel,

    /// The environment rejected the action.
    #[error(transparent)]
    World(#[from] WorldError),
}
