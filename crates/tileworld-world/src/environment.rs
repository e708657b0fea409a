//! The environment interface agents act against.
//!
//! Agents never mutate the world directly. They sense a window around
//! themselves and submit explicit actions; the environment validates each
//! action against the true cell state and either applies it or rejects it
//! with a [`WorldError`].

use tileworld_types::{Direction, Position, SensedWindow};

use crate::error::WorldError;

/// The collaborator an agent senses and acts through.
pub trait Environment {
    /// Current simulation time in ticks.
    fn now(&self) -> u64;

    /// Whether the position lies on the map.
    fn in_bounds(&self, pos: Position) -> bool;

    /// Objects within `range` (Chebyshev) of `center`.
    fn sense(&self, center: Position, range: u32) -> SensedWindow;

    /// Validate a one-step move and return the new position.
    ///
    /// [`Direction::Stay`] always succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] or [`WorldError::CellBlocked`].
    fn try_move(&self, from: Position, direction: Direction) -> Result<Position, WorldError>;

    /// Whether a tile can be picked up at the position right now.
    fn can_pickup(&self, pos: Position) -> bool;

    /// Whether a hole can be filled at the position right now.
    fn can_fill(&self, pos: Position) -> bool;

    /// Remove the tile at the position.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NoTile`] if the cell holds no tile.
    fn pickup_tile(&mut self, pos: Position) -> Result<(), WorldError>;

    /// Fill the hole at the position.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NoHole`] if the cell holds no hole.
    fn fill_hole(&mut self, pos: Position) -> Result<(), WorldError>;

    /// Refuel at the position and return the new fuel level.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NoFuelStation`] away from the station.
    fn refuel(&mut self, pos: Position) -> Result<u32, WorldError>;
}
