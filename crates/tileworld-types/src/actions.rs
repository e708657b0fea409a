//! Action types exchanged between an agent's `think` and `act` steps, and
//! the per-tick report the scheduler collects.

use serde::{Deserialize, Serialize};

use crate::enums::Mode;
use crate::geometry::{Direction, Position};
use crate::ids::AgentId;

/// An action an agent can take in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "direction", rename_all = "snake_case")]
pub enum Action {
    /// Move one cell (or stay in place with [`Direction::Stay`]).
    Move(Direction),
    /// Pick up the tile in the current cell.
    Pickup,
    /// Put a carried tile into the hole in the current cell.
    Putdown,
    /// Refuel at the fuel station in the current cell.
    Refuel,
}

impl Action {
    /// The idle action.
    pub const HOLD: Self = Self::Move(Direction::Stay);

    /// Whether the action leaves the agent where it is without effect.
    pub const fn is_hold(self) -> bool {
        matches!(self, Self::Move(Direction::Stay))
    }
}

/// The result of an agent's deliberation for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thought {
    /// The chosen action.
    pub action: Action,
    /// The mode that produced it.
    pub mode: Mode,
    /// The current goal cell, if any.
    pub goal: Option<Position>,
}

impl Thought {
    /// Hold position in the given mode.
    pub const fn hold(mode: Mode, goal: Option<Position>) -> Self {
        Self {
            action: Action::HOLD,
            mode,
            goal,
        }
    }
}

/// How an action fared against the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The environment accepted the action.
    Succeeded,
    /// The agent held position on purpose.
    Held,
    /// The environment rejected the action.
    Rejected {
        /// Why.
        reason: String,
    },
}

impl ActionOutcome {
    /// Whether the environment rejected the action.
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// What one agent did in one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReport {
    /// The acting agent.
    pub agent_id: AgentId,
    /// The tick.
    pub tick: u64,
    /// Mode chosen this tick.
    pub mode: Mode,
    /// Goal cell this tick, if any.
    pub goal: Option<Position>,
    /// The action taken.
    pub action: Action,
    /// The environment's verdict.
    pub outcome: ActionOutcome,
    /// Position after acting.
    pub position: Position,
    /// Fuel after acting.
    pub fuel: u32,
    /// Tiles carried after acting.
    pub carried: u32,
    /// Holes filled so far.
    pub score: u32,
}
