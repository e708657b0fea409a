//! Decaying percept memory and the exploration model.
//!
//! Each agent keeps a private [`PerceptGrid`] of last-known occupants. The
//! grid changes in only four ways:
//!
//! - **Sensing** refreshes the window around the agent every tick: cells in
//!   range are cleared and re-filled from what is actually seen. An object
//!   seen again keeps its first-seen timestamp so lifetime estimates stay
//!   honest.
//! - **Decay** forgets objects older than the horizon. The fuel station is
//!   never forgotten.
//! - **Merging** imports a peer's view of the cells inside the peer's own
//!   sensor window. The newer timestamp wins, and a peer reporting a cell
//!   empty clears it.
//! - **Forgetting** a single cell after this agent consumed its object.
//!
//! Alongside the grid, every cell carries an exploration score: `+inf` until
//! first seen, `0` on the tick it is sensed or merged, then `1` and doubling
//! every tick it stays unobserved.

use std::collections::BTreeMap;

use tileworld_types::{GridRect, ObjectKind, Percept, PerceptGrid, Position, SensedWindow, Target};
use tracing::trace;

/// An agent's private model of the world.
#[derive(Debug, Clone)]
pub struct DecayMemory {
    grid: PerceptGrid,
    exploration: Vec<f64>,
    fuel_station: Option<Position>,
    closest_sensed: BTreeMap<ObjectKind, Position>,
    horizon: u64,
    sensor_range: u32,
    now: u64,
}

impl DecayMemory {
    /// Create an empty memory for a `width × height` map.
    pub fn new(width: u32, height: u32, horizon: u64, sensor_range: u32) -> Self {
        let grid = PerceptGrid::new(width, height);
        let cells = grid.bounds().area();
        let len = usize::try_from(cells).unwrap_or(usize::MAX);
        Self {
            grid,
            exploration: vec![f64::INFINITY; len],
            fuel_station: None,
            closest_sensed: BTreeMap::new(),
            horizon,
            sensor_range,
            now: 0,
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// The remembered percepts, as shared in MAP broadcasts.
    pub const fn snapshot(&self) -> &PerceptGrid {
        &self.grid
    }

    /// The map rectangle.
    pub fn bounds(&self) -> GridRect {
        self.grid.bounds()
    }

    /// The time of the latest decay pass.
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Ticks after which a remembered object is forgotten.
    pub const fn horizon(&self) -> u64 {
        self.horizon
    }

    /// The remembered percept in a cell.
    pub fn get(&self, pos: Position) -> Option<&Percept> {
        self.grid.get(pos)
    }

    /// Where the fuel station is, once anyone has seen it.
    pub const fn fuel_station(&self) -> Option<Position> {
        self.fuel_station
    }

    /// Number of remembered objects.
    pub fn remembered_count(&self) -> usize {
        self.grid.len()
    }

    /// The closest object of a kind seen in the latest sensed window.
    pub fn closest_sensed(&self, kind: ObjectKind) -> Option<Position> {
        self.closest_sensed.get(&kind).copied()
    }

    /// Whether the cell is believed to hold an obstacle. Unknown cells are
    /// passable.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.grid
            .get(pos)
            .is_some_and(|p| p.kind.blocks_movement())
    }

    /// The exploration score of a cell, or `None` off the map.
    pub fn exploration_score(&self, pos: Position) -> Option<f64> {
        self.score_index(pos)
            .and_then(|i| self.exploration.get(i))
            .copied()
    }

    /// Sum of exploration scores over the sensor window centred on `anchor`.
    ///
    /// Cells past the map edge take the score of the cell mirrored across
    /// that edge, so anchors near the boundary are not undervalued.
    pub fn anchor_exploration_score(&self, anchor: Position) -> f64 {
        let bounds = self.bounds();
        GridRect::around(anchor, self.sensor_range)
            .cells()
            .map(|cell| {
                let mirrored = Position::new(
                    mirror(cell.x, bounds.min.x, bounds.max.x),
                    mirror(cell.y, bounds.min.y, bounds.max.y),
                );
                self.exploration_score(mirrored).unwrap_or(0.0)
            })
            .sum()
    }

    /// Estimated ticks left before the object in a cell disappears:
    /// `horizon × threshold − age`, or `0` if nothing is remembered there.
    pub fn estimated_remaining_lifetime(&self, pos: Position, threshold: f64) -> f64 {
        let Some(percept) = self.grid.get(pos) else {
            return 0.0;
        };
        // Horizons and ages are tick counts far below 2^52.
        #[allow(clippy::cast_precision_loss)]
        let (horizon, age) = (self.horizon as f64, percept.age(self.now) as f64);
        horizon.mul_add(threshold, -age)
    }

    /// Whether the object in a cell is expected to outlive a trip of
    /// `distance` steps.
    pub fn is_reachable(&self, pos: Position, distance: u32, threshold: f64) -> bool {
        self.estimated_remaining_lifetime(pos, threshold) > f64::from(distance)
    }

    /// Remembered tiles or holes inside a rectangle, in row-major order.
    ///
    /// The fuel station is never a candidate.
    pub fn objects_in_zone(&self, zone: GridRect, kind: ObjectKind) -> Vec<Target> {
        if kind == ObjectKind::FuelStation {
            return Vec::new();
        }
        zone.cells()
            .filter_map(|pos| self.grid.get(pos))
            .filter(|p| p.kind == kind)
            .map(Percept::target)
            .collect()
    }

    // -------------------------------------------------------------------
    // Updates
    // -------------------------------------------------------------------

    /// Age the memory to `now`. Runs once per tick before sensing.
    ///
    /// Forgets every non-station percept older than the horizon and
    /// advances every exploration score.
    pub fn decay(&mut self, now: u64) {
        self.now = now;
        let horizon = self.horizon;
        let forgotten = self
            .grid
            .retain(|p| !p.kind.decays() || p.age(now) <= horizon);
        for score in &mut self.exploration {
            *score = if *score > 0.0 { *score * 2.0 } else { 1.0 };
        }
        if forgotten > 0 {
            trace!(now, forgotten, "percepts decayed");
        }
    }

    /// Replace the sensed window with what was actually seen.
    pub fn observe(&mut self, window: &SensedWindow) {
        let rect = window.rect();
        let mut previous: BTreeMap<Position, Percept> = BTreeMap::new();
        for pos in rect.cells() {
            if let Some(old) = self.grid.clear(pos) {
                previous.insert(pos, old);
            }
            self.reset_score(pos);
        }

        self.closest_sensed.clear();
        for object in &window.objects {
            if !rect.contains(object.position) || !self.grid.in_bounds(object.position) {
                continue;
            }
            let observed_at = previous
                .get(&object.position)
                .filter(|old| old.kind == object.kind)
                .map_or(self.now, |old| old.observed_at);
            self.grid.set(
                object.position,
                Some(Percept::new(object.kind, object.position, observed_at)),
            );
            if object.kind == ObjectKind::FuelStation && self.fuel_station.is_none() {
                self.fuel_station = Some(object.position);
            }
            self.note_closest(window.center, object.kind, object.position);
        }
    }

    /// Import a peer's percepts for the cells inside the peer's own sensor
    /// window around `peer_position`.
    pub fn merge(&mut self, peer: &PerceptGrid, peer_position: Position) {
        let window = GridRect::around(peer_position, self.sensor_range);
        let bounds = self.bounds();
        for pos in window.cells() {
            if !bounds.contains(pos) || !peer.in_bounds(pos) {
                continue;
            }
            self.reset_score(pos);
            if self.fuel_station == Some(pos) {
                continue;
            }
            match peer.get(pos) {
                None => {
                    self.grid.clear(pos);
                }
                Some(theirs) => {
                    if theirs.kind == ObjectKind::FuelStation && self.fuel_station.is_none() {
                        self.fuel_station = Some(pos);
                    }
                    let newer = self
                        .grid
                        .get(pos)
                        .is_none_or(|ours| theirs.observed_at > ours.observed_at);
                    if newer {
                        self.grid.set(pos, Some(*theirs));
                    }
                }
            }
        }
    }

    /// Forget a cell after this agent consumed its object.
    pub fn forget(&mut self, pos: Position) -> Option<Percept> {
        if self.fuel_station == Some(pos) {
            return None;
        }
        self.grid.clear(pos)
    }

    // -------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------

    fn score_index(&self, pos: Position) -> Option<usize> {
        let x = u64::try_from(pos.x).ok()?;
        let y = u64::try_from(pos.y).ok()?;
        let (width, height) = (u64::from(self.grid.width()), u64::from(self.grid.height()));
        if x >= width || y >= height {
            return None;
        }
        usize::try_from(y.checked_mul(width)?.checked_add(x)?).ok()
    }

    fn reset_score(&mut self, pos: Position) {
        if let Some(score) = self.score_index(pos).and_then(|i| self.exploration.get_mut(i)) {
            *score = 0.0;
        }
    }

    fn note_closest(&mut self, from: Position, kind: ObjectKind, pos: Position) {
        let closer = self
            .closest_sensed
            .get(&kind)
            .is_none_or(|&best| from.manhattan(pos) < from.manhattan(best));
        if closer {
            self.closest_sensed.insert(kind, pos);
        }
    }
}

/// Reflect a coordinate that fell off `[min, max]` back across the edge.
const fn mirror(value: i32, min: i32, max: i32) -> i32 {
    let reflected = if value < min {
        min.saturating_add(min.saturating_sub(value))
    } else if value > max {
        max.saturating_sub(value.saturating_sub(max))
    } else {
        value
    };
    if reflected < min {
        min
    } else if reflected > max {
        max
    } else {
        reflected
    }
}
