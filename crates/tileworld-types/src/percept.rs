//! Percepts, sensed windows, targets, and the percept grid.
//!
//! A [`Percept`] is a timestamped belief about the occupant of one cell. The
//! [`PerceptGrid`] holds at most one percept per cell and is the payload an
//! agent shares with its peers in a MAP broadcast.

use serde::{Deserialize, Serialize};

use crate::enums::ObjectKind;
use crate::geometry::{GridRect, Position};

/// A timestamped belief about one grid cell's occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percept {
    /// What occupies the cell.
    pub kind: ObjectKind,
    /// Where.
    pub position: Position,
    /// Tick at which the object was first seen in this cell.
    pub observed_at: u64,
}

impl Percept {
    /// Create a percept.
    pub const fn new(kind: ObjectKind, position: Position, observed_at: u64) -> Self {
        Self {
            kind,
            position,
            observed_at,
        }
    }

    /// Ticks elapsed since the percept was recorded.
    pub const fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.observed_at)
    }

    /// The target this percept describes.
    pub const fn target(&self) -> Target {
        Target::new(self.kind, self.position)
    }
}

/// An object reported by the environment's sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensedObject {
    /// What was sensed.
    pub kind: ObjectKind,
    /// Where.
    pub position: Position,
}

/// Everything an agent senses in one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensedWindow {
    /// The sensing agent's position.
    pub center: Position,
    /// Sensor range (Chebyshev radius of the window).
    pub range: u32,
    /// Objects inside the window.
    pub objects: Vec<SensedObject>,
}

impl SensedWindow {
    /// The window rectangle, not clipped to the map.
    pub const fn rect(&self) -> GridRect {
        GridRect::around(self.center, self.range)
    }
}

/// A goal or contract: a position plus the kind of object expected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Expected object kind.
    pub kind: ObjectKind,
    /// Cell of the object.
    pub position: Position,
}

impl Target {
    /// Create a target.
    pub const fn new(kind: ObjectKind, position: Position) -> Self {
        Self { kind, position }
    }
}

impl core::fmt::Display for Target {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}@{}", self.kind, self.position)
    }
}

/// A `width × height` grid with at most one percept per cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerceptGrid {
    width: u32,
    height: u32,
    cells: Vec<Option<Percept>>,
}

impl PerceptGrid {
    /// Create an empty grid.
    pub fn new(width: u32, height: u32) -> Self {
        let len = usize::try_from(u64::from(width).saturating_mul(u64::from(height)))
            .unwrap_or(usize::MAX);
        Self {
            width,
            height,
            cells: vec![None; len],
        }
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The rectangle covering the whole grid.
    pub fn bounds(&self) -> GridRect {
        GridRect::from_dimensions(self.width, self.height)
    }

    /// Whether the position is inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        let x = u32::try_from(pos.x).ok()?;
        let y = u32::try_from(pos.y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let flat = u64::from(y)
            .checked_mul(u64::from(self.width))?
            .checked_add(u64::from(x))?;
        usize::try_from(flat).ok()
    }

    /// The percept at a cell, if any.
    pub fn get(&self, pos: Position) -> Option<&Percept> {
        self.index(pos)
            .and_then(|i| self.cells.get(i))
            .and_then(Option::as_ref)
    }

    /// Replace the content of a cell and return the previous content.
    ///
    /// Writes outside the grid are ignored and return `None`.
    pub fn set(&mut self, pos: Position, percept: Option<Percept>) -> Option<Percept> {
        let slot = self.index(pos).and_then(|i| self.cells.get_mut(i))?;
        core::mem::replace(slot, percept)
    }

    /// Clear a cell and return its previous content.
    pub fn clear(&mut self, pos: Position) -> Option<Percept> {
        self.set(pos, None)
    }

    /// Iterate over all remembered percepts in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Percept> {
        self.cells.iter().filter_map(Option::as_ref)
    }

    /// Number of remembered percepts.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the grid holds no percepts.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Drop every percept for which the predicate returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(&Percept) -> bool) -> usize {
        let mut removed: usize = 0;
        for slot in &mut self.cells {
            if slot.as_ref().is_some_and(|p| !keep(p)) {
                *slot = None;
                removed = removed.saturating_add(1);
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut grid = PerceptGrid::new(4, 3);
        let pos = Position::new(3, 2);
        assert!(grid.get(pos).is_none());
        let previous = grid.set(pos, Some(Percept::new(ObjectKind::Tile, pos, 5)));
        assert!(previous.is_none());
        assert_eq!(grid.get(pos).map(|p| p.kind), Some(ObjectKind::Tile));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut grid = PerceptGrid::new(2, 2);
        let outside = Position::new(2, 0);
        assert!(!grid.in_bounds(outside));
        assert!(grid.set(outside, Some(Percept::new(ObjectKind::Hole, outside, 0))).is_none());
        assert!(grid.get(outside).is_none());
        assert!(grid.get(Position::new(-1, 0)).is_none());
        assert!(grid.is_empty());
    }

    #[test]
    fn retain_removes_rejected() {
        let mut grid = PerceptGrid::new(3, 1);
        for x in 0..3 {
            let pos = Position::new(x, 0);
            grid.set(pos, Some(Percept::new(ObjectKind::Tile, pos, u64::try_from(x).unwrap_or(0))));
        }
        let removed = grid.retain(|p| p.observed_at >= 1);
        assert_eq!(removed, 1);
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn percept_age_saturates() {
        let p = Percept::new(ObjectKind::Tile, Position::new(0, 0), 10);
        assert_eq!(p.age(15), 5);
        assert_eq!(p.age(3), 0);
    }
}
