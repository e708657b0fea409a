//! Type-safe identifier wrappers.
//!
//! Agents are identified by their position in the scheduler's fixed turn
//! order, so [`AgentId`] wraps a plain index. Runs are identified by a UUID v7
//! (time-ordered) so that logs from separate runs can be told apart.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an agent in the simulation.
///
/// The inner value is the agent's index in the fixed turn order. Zone
/// assignment breaks distance ties by this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    /// Create an identifier from a turn-order index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the turn-order index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "agent{}", self.0.saturating_add(1))
    }
}

impl From<u32> for AgentId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

/// Unique identifier for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RunId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_names_are_one_based() {
        assert_eq!(AgentId::new(0).to_string(), "agent1");
        assert_eq!(AgentId::new(4).to_string(), "agent5");
    }

    #[test]
    fn agent_ids_order_by_turn() {
        assert!(AgentId::new(0) < AgentId::new(1));
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }
}
