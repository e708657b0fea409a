//! Grid geometry: positions, move directions, and rectangles.
//!
//! Coordinates are signed so that neighbours of edge cells can be computed
//! and then rejected by a bounds check instead of wrapping. `y` grows
//! downwards; [`Direction::North`] decreases it.

use serde::{Deserialize, Serialize};

/// A cell coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// The adjacent position in the given direction.
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single-step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `y - 1`.
    North,
    /// `y + 1`.
    South,
    /// `x + 1`.
    East,
    /// `x - 1`.
    West,
    /// No movement.
    Stay,
}

impl Direction {
    /// The four movement directions, in planner expansion order.
    pub const MOVES: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// `(dx, dy)` for this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::Stay => (0, 0),
        }
    }
}

/// An axis-aligned rectangle of cells with inclusive corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    /// Top-left corner (inclusive).
    pub min: Position,
    /// Bottom-right corner (inclusive).
    pub max: Position,
}

impl GridRect {
    /// Create a rectangle from inclusive corners.
    pub const fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    /// The rectangle covering a `width × height` map anchored at the origin.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        let max_x = i32::try_from(width).unwrap_or(i32::MAX).saturating_sub(1);
        let max_y = i32::try_from(height).unwrap_or(i32::MAX).saturating_sub(1);
        Self::new(Position::new(0, 0), Position::new(max_x, max_y))
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        if self.max.x < self.min.x {
            return 0;
        }
        self.max.x.abs_diff(self.min.x).saturating_add(1)
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        if self.max.y < self.min.y {
            return 0;
        }
        self.max.y.abs_diff(self.min.y).saturating_add(1)
    }

    /// Number of cells.
    pub const fn area(&self) -> u64 {
        (self.width() as u64).saturating_mul(self.height() as u64)
    }

    /// Whether the position lies inside the rectangle.
    pub const fn contains(&self, pos: Position) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }

    /// The square window of the given radius around a center, not clipped.
    pub const fn around(center: Position, radius: u32) -> Self {
        let r = if radius > i32::MAX as u32 { i32::MAX } else { radius as i32 };
        Self::new(
            Position::new(center.x.saturating_sub(r), center.y.saturating_sub(r)),
            Position::new(center.x.saturating_add(r), center.y.saturating_add(r)),
        )
    }

    /// Iterate over all cells row by row.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (self.min.y..=self.max.y)
            .flat_map(move |y| (self.min.x..=self.max.x).map(move |x| Position::new(x, y)))
    }
}
