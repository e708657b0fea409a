//! Enumeration types for the Tileworld simulation.
//!
//! The set of world objects, agent behaviour modes, and broadcast topics is
//! fixed, so each is a closed enum matched exhaustively.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Object kinds
// ---------------------------------------------------------------------------

/// An object that can occupy a grid cell.
///
/// At most one object occupies a cell at a time. Tiles are picked up and
/// carried, holes are filled with carried tiles, obstacles block movement,
/// and the single fuel station refuels agents standing on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// A collectable tile.
    Tile,
    /// A hole that consumes one carried tile when filled.
    Hole,
    /// An impassable obstacle.
    Obstacle,
    /// The fuel station. Never expires.
    FuelStation,
}

impl ObjectKind {
    /// Whether the object decays after the configured lifetime.
    pub const fn decays(self) -> bool {
        match self {
            Self::Tile | Self::Hole | Self::Obstacle => true,
            Self::FuelStation => false,
        }
    }

    /// Whether the object blocks movement into its cell.
    pub const fn blocks_movement(self) -> bool {
        match self {
            Self::Obstacle => true,
            Self::Tile | Self::Hole | Self::FuelStation => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Agent modes
// ---------------------------------------------------------------------------

/// The behaviour an agent commits to for one tick.
///
/// Re-evaluated from scratch every tick by the mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Visit the zone anchor with the highest exploration score.
    Explore,
    /// Move to the best tile candidate in the own zone.
    Collect,
    /// Move to the best hole candidate in the own zone.
    Fill,
    /// Move to (or use) the fuel station.
    Refuel,
    /// Move to a tile auctioned by a neighbouring zone.
    AssistCollect,
    /// Move to a hole auctioned by a neighbouring zone.
    AssistFill,
    /// Pick up the tile under the agent.
    ReactCollect,
    /// Fill the hole under the agent.
    ReactFill,
    /// Hold position; no safe action is available.
    Wait,
}

impl Mode {
    /// Upper-case name as used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Explore => "EXPLORE",
            Self::Collect => "COLLECT",
            Self::Fill => "FILL",
            Self::Refuel => "REFUEL",
            Self::AssistCollect => "ASSIST_COLLECT",
            Self::AssistFill => "ASSIST_FILL",
            Self::ReactCollect => "REACT_COLLECT",
            Self::ReactFill => "REACT_FILL",
            Self::Wait => "WAIT",
        }
    }
}

impl core::fmt::Display for Mode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Broadcast topics
// ---------------------------------------------------------------------------

/// Topic of a broadcast message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Topic {
    /// Full percept snapshot plus sender position.
    Map,
    /// Targets the sender has committed to.
    Goals,
    /// Surplus tiles offered to nearby zones.
    AuctionTile,
    /// Surplus holes offered to nearby zones.
    AuctionHole,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn only_fuel_station_is_permanent() {
        assert!(ObjectKind::Tile.decays());
        assert!(ObjectKind::Hole.decays());
        assert!(ObjectKind::Obstacle.decays());
        assert!(!ObjectKind::FuelStation.decays());
    }

    #[test]
    fn only_obstacles_block() {
        assert!(ObjectKind::Obstacle.blocks_movement());
        assert!(!ObjectKind::Tile.blocks_movement());
        assert!(!ObjectKind::FuelStation.blocks_movement());
    }

    #[test]
    fn mode_serializes_in_log_form() {
        let json = serde_json::to_string(&Mode::AssistCollect).unwrap();
        assert_eq!(json, "\"ASSIST_COLLECT\"");
        assert_eq!(Mode::ReactFill.to_string(), "REACT_FILL");
    }
}
