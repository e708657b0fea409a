//! The in-memory grid world.
//!
//! [`GridWorld`] holds the true occupant of every cell, advances object
//! lifetimes once per tick, creates new objects at the configured rates, and
//! validates agent actions. Cells are keyed in a [`BTreeMap`] so that
//! iteration order, and therefore every seeded run, is deterministic.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tileworld_types::{Direction, GridRect, ObjectKind, Position, SensedObject, SensedWindow};
use tracing::debug;

use crate::environment::Environment;
use crate::error::WorldError;
use crate::spawn::{ObjectConfig, sample_count};

/// Placement attempts before giving up on finding an empty cell.
const MAX_PLACEMENT_ATTEMPTS: u32 = 64;

/// An object living in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WorldObject {
    kind: ObjectKind,
    created_at: u64,
}

/// What changed in the world during one [`GridWorld::advance`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldStep {
    /// The new simulation time.
    pub tick: u64,
    /// Objects created this tick.
    pub created: Vec<SensedObject>,
    /// Number of objects that reached the end of their lifetime.
    pub expired: usize,
}

/// The true state of the grid.
#[derive(Debug, Clone)]
pub struct GridWorld {
    bounds: GridRect,
    now: u64,
    cells: BTreeMap<Position, WorldObject>,
    fuel_station: Option<Position>,
    full_fuel: u32,
    objects: ObjectConfig,
    rng: StdRng,
}

impl GridWorld {
    /// Create an empty world. No fuel station is placed yet.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either dimension is zero
    /// or does not fit a signed coordinate.
    pub fn new(
        width: u32,
        height: u32,
        objects: ObjectConfig,
        full_fuel: u32,
        seed: u64,
    ) -> Result<Self, WorldError> {
        if width == 0 || height == 0 || i32::try_from(width).is_err() || i32::try_from(height).is_err()
        {
            return Err(WorldError::InvalidDimensions { width, height });
        }
        Ok(Self {
            bounds: GridRect::from_dimensions(width, height),
            now: 0,
            cells: BTreeMap::new(),
            fuel_station: None,
            full_fuel,
            objects,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// The rectangle covering the map.
    pub const fn bounds(&self) -> GridRect {
        self.bounds
    }

    /// Where the fuel station is, once placed.
    pub const fn fuel_station(&self) -> Option<Position> {
        self.fuel_station
    }

    /// The object in a cell, if any.
    pub fn object_at(&self, pos: Position) -> Option<ObjectKind> {
        self.cells.get(&pos).map(|o| o.kind)
    }

    /// Number of live objects of a kind.
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.cells.values().filter(|o| o.kind == kind).count()
    }

    /// Place an object on an empty cell at the current tick.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] or [`WorldError::CellOccupied`].
    pub fn place(&mut self, kind: ObjectKind, pos: Position) -> Result<(), WorldError> {
        if !self.bounds.contains(pos) {
            return Err(WorldError::OutOfBounds(pos));
        }
        if self.cells.contains_key(&pos) {
            return Err(WorldError::CellOccupied(pos));
        }
        if kind == ObjectKind::FuelStation
            && let Some(old) = self.fuel_station.replace(pos)
        {
            self.cells.remove(&old);
        }
        self.cells.insert(
            pos,
            WorldObject {
                kind,
                created_at: self.now,
            },
        );
        Ok(())
    }

    /// Place the fuel station at a given cell, or at a random empty cell.
    ///
    /// # Errors
    ///
    /// Returns the placement error, or [`WorldError::NoEmptyCell`].
    pub fn place_fuel_station(&mut self, at: Option<Position>) -> Result<Position, WorldError> {
        let pos = match at {
            Some(pos) => pos,
            None => self.random_empty_cell().ok_or(WorldError::NoEmptyCell)?,
        };
        self.place(ObjectKind::FuelStation, pos)?;
        Ok(pos)
    }

    /// A uniformly drawn empty cell, if one is found within a bounded number
    /// of attempts.
    pub fn random_empty_cell(&mut self) -> Option<Position> {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let x = self.rng.random_range(self.bounds.min.x..=self.bounds.max.x);
            let y = self.rng.random_range(self.bounds.min.y..=self.bounds.max.y);
            let pos = Position::new(x, y);
            if !self.cells.contains_key(&pos) {
                return Some(pos);
            }
        }
        None
    }

    /// Advance one tick: expire objects past their lifetime, then create new
    /// ones.
    pub fn advance(&mut self) -> WorldStep {
        self.now = self.now.saturating_add(1);
        let now = self.now;
        let lifetime = self.objects.lifetime;

        let before = self.cells.len();
        self.cells
            .retain(|_, o| !o.kind.decays() || now.saturating_sub(o.created_at) < lifetime);
        let expired = before.saturating_sub(self.cells.len());

        let mut created = Vec::new();
        let rates = [
            (ObjectKind::Tile, self.objects.tile_mean, self.objects.tile_dev),
            (ObjectKind::Hole, self.objects.hole_mean, self.objects.hole_dev),
            (ObjectKind::Obstacle, self.objects.obstacle_mean, self.objects.obstacle_dev),
        ];
        for (kind, mean, dev) in rates {
            let count = sample_count(&mut self.rng, mean, dev);
            for _ in 0..count {
                let Some(pos) = self.random_empty_cell() else {
                    break;
                };
                self.cells.insert(pos, WorldObject { kind, created_at: now });
                created.push(SensedObject { kind, position: pos });
            }
        }

        debug!(tick = now, expired, created = created.len(), "world advanced");
        WorldStep {
            tick: now,
            created,
            expired,
        }
    }
}

impl Environment for GridWorld {
    fn now(&self) -> u64 {
        self.now
    }

    fn in_bounds(&self, pos: Position) -> bool {
        self.bounds.contains(pos)
    }

    fn sense(&self, center: Position, range: u32) -> SensedWindow {
        let window = GridRect::around(center, range);
        let objects = self
            .cells
            .range(window.min..=window.max)
            .filter(|(pos, _)| window.contains(**pos))
            .map(|(&position, o)| SensedObject {
                kind: o.kind,
                position,
            })
            .collect();
        SensedWindow {
            center,
            range,
            objects,
        }
    }

    fn try_move(&self, from: Position, direction: Direction) -> Result<Position, WorldError> {
        let to = from.step(direction);
        if !self.bounds.contains(to) {
            return Err(WorldError::OutOfBounds(to));
        }
        if self.object_at(to).is_some_and(ObjectKind::blocks_movement) {
            return Err(WorldError::CellBlocked(to));
        }
        Ok(to)
    }

    fn can_pickup(&self, pos: Position) -> bool {
        self.object_at(pos) == Some(ObjectKind::Tile)
    }

    fn can_fill(&self, pos: Position) -> bool {
        self.object_at(pos) == Some(ObjectKind::Hole)
    }

    fn pickup_tile(&mut self, pos: Position) -> Result<(), WorldError> {
        if !self.can_pickup(pos) {
            return Err(WorldError::NoTile(pos));
        }
        self.cells.remove(&pos);
        Ok(())
    }

    fn fill_hole(&mut self, pos: Position) -> Result<(), WorldError> {
        if !self.can_fill(pos) {
            return Err(WorldError::NoHole(pos));
        }
        self.cells.remove(&pos);
        Ok(())
    }

    fn refuel(&mut self, pos: Position) -> Result<u32, WorldError> {
        if self.fuel_station != Some(pos) {
            return Err(WorldError::NoFuelStation(pos));
        }
        Ok(self.full_fuel)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn static_world(width: u32, height: u32) -> GridWorld {
        GridWorld::new(width, height, ObjectConfig::static_world(10), 500, 1).unwrap()
    }

    #[test]
    fn rejects_empty_dimensions() {
        let result = GridWorld::new(0, 5, ObjectConfig::default(), 500, 1);
        assert!(matches!(result, Err(WorldError::InvalidDimensions { .. })));
    }

    #[test]
    fn sense_reports_only_window() {
        let mut world = static_world(10, 10);
        world.place(ObjectKind::Tile, Position::new(2, 2)).unwrap();
        world.place(ObjectKind::Hole, Position::new(5, 5)).unwrap();
        world.place(ObjectKind::Obstacle, Position::new(2, 6)).unwrap();

        let window = world.sense(Position::new(3, 3), 1);
        assert_eq!(window.objects.len(), 1);
        assert_eq!(window.objects.first().map(|o| o.kind), Some(ObjectKind::Tile));

        let wide = world.sense(Position::new(3, 3), 3);
        assert_eq!(wide.objects.len(), 3);
    }

    #[test]
    fn move_into_obstacle_is_blocked() {
        let mut world = static_world(5, 5);
        world.place(ObjectKind::Obstacle, Position::new(1, 0)).unwrap();
        let result = world.try_move(Position::new(0, 0), Direction::East);
        assert_eq!(result, Err(WorldError::CellBlocked(Position::new(1, 0))));
        let result = world.try_move(Position::new(0, 0), Direction::North);
        assert_eq!(result, Err(WorldError::OutOfBounds(Position::new(0, -1))));
        let result = world.try_move(Position::new(0, 0), Direction::South);
        assert_eq!(result, Ok(Position::new(0, 1)));
    }

    #[test]
    fn pickup_and_fill_consume_objects() {
        let mut world = static_world(5, 5);
        let tile = Position::new(1, 1);
        let hole = Position::new(2, 2);
        world.place(ObjectKind::Tile, tile).unwrap();
        world.place(ObjectKind::Hole, hole).unwrap();

        assert!(world.can_pickup(tile));
        assert!(world.pickup_tile(tile).is_ok());
        assert!(!world.can_pickup(tile));
        assert_eq!(world.pickup_tile(tile), Err(WorldError::NoTile(tile)));

        assert!(world.fill_hole(tile).is_err());
        assert!(world.fill_hole(hole).is_ok());
        assert_eq!(world.count(ObjectKind::Hole), 0);
    }

    #[test]
    fn refuel_only_at_station() {
        let mut world = static_world(5, 5);
        let station = world.place_fuel_station(Some(Position::new(4, 4))).unwrap();
        assert_eq!(world.refuel(station), Ok(500));
        assert!(world.refuel(Position::new(0, 0)).is_err());
    }

    #[test]
    fn objects_expire_but_station_stays() {
        let mut world = static_world(5, 5);
        world.place(ObjectKind::Tile, Position::new(0, 0)).unwrap();
        world.place_fuel_station(Some(Position::new(4, 4))).unwrap();
        for _ in 0..9 {
            world.advance();
        }
        assert_eq!(world.count(ObjectKind::Tile), 1);
        let step = world.advance();
        assert_eq!(step.expired, 1);
        assert_eq!(world.count(ObjectKind::Tile), 0);
        assert_eq!(world.count(ObjectKind::FuelStation), 1);
    }

    #[test]
    fn seeded_worlds_are_reproducible() {
        let config = ObjectConfig {
            tile_mean: 1.5,
            hole_mean: 1.0,
            obstacle_mean: 0.5,
            ..ObjectConfig::default()
        };
        let mut a = GridWorld::new(20, 20, config.clone(), 500, 42).unwrap();
        let mut b = GridWorld::new(20, 20, config, 500, 42).unwrap();
        for _ in 0..20 {
            assert_eq!(a.advance(), b.advance());
        }
    }
}
