//! Error types for the `tileworld-world` crate.
//!
//! Every action an agent submits is validated against the true world state.
//! When the agent's belief was wrong, the action is rejected with a
//! [`WorldError`]; none of these are fatal to the simulation.

use tileworld_types::Position;

/// Errors returned by environment queries and actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The position lies outside the map.
    #[error("position {0} is out of bounds")]
    OutOfBounds(Position),

    /// The target cell holds an obstacle.
    #[error("cell {0} is blocked")]
    CellBlocked(Position),

    /// A pickup was attempted on a cell without a tile.
    #[error("no tile at {0}")]
    NoTile(Position),

    /// A fill was attempted on a cell without a hole.
    #[error("no hole at {0}")]
    NoHole(Position),

    /// A refuel was attempted away from the fuel station.
    #[error("no fuel station at {0}")]
    NoFuelStation(Position),

    /// An object was placed on an occupied cell.
    #[error("cell {0} is already occupied")]
    CellOccupied(Position),

    /// The map has a zero or unrepresentable dimension.
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// No empty cell was found for placing an object.
    #[error("no empty cell available")]
    NoEmptyCell,
}
