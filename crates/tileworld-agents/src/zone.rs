//! Static zone partitioning and anchor layout.
//!
//! On its first tick without a zone, every agent independently splits the
//! map into one band per agent along the longer side and assigns bands
//! greedily to the nearest agent. All agents see the same MAP broadcasts, so
//! they all reach the same assignment without negotiating.
//!
//! Inside its zone an agent patrols a lattice of anchors spaced
//! `2 × sensor_range + 1` apart, so that standing on every anchor once senses
//! every cell of the zone. Anchor rows alternate direction.

use serde::{Deserialize, Serialize};
use tileworld_types::{GridRect, Position};

use crate::error::AgentError;

/// The axis bands are stacked along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    /// Horizontal bands stacked top to bottom.
    Rows,
    /// Vertical bands side by side.
    Columns,
}

impl SplitAxis {
    /// Rows when the map is at least as tall as it is wide.
    pub const fn for_map(map: &GridRect) -> Self {
        if map.width() <= map.height() {
            Self::Rows
        } else {
            Self::Columns
        }
    }
}

/// One agent's patrol region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Band index, counted from the top or left edge.
    pub index: u32,
    /// Inclusive bounds.
    pub rect: GridRect,
    /// Waypoints in patrol order.
    pub anchors: Vec<Position>,
}

impl Zone {
    /// Zone index distance to another zone.
    pub const fn distance_to(&self, other: u32) -> u32 {
        self.index.abs_diff(other)
    }
}

/// Split `map` into `count` bands. The last band absorbs the remainder.
pub fn partition(map: GridRect, count: usize) -> Result<Vec<GridRect>, AgentError> {
    let axis = SplitAxis::for_map(&map);
    let extent = match axis {
        SplitAxis::Rows => map.height(),
        SplitAxis::Columns => map.width(),
    };
    let too_many = AgentError::TooManyAgents {
        agents: count,
        extent,
    };
    let Ok(n) = u32::try_from(count) else {
        return Err(too_many);
    };
    if n == 0 || n > extent {
        return Err(too_many);
    }
    let Some(band) = extent.checked_div(n).and_then(|b| i32::try_from(b).ok()) else {
        return Err(too_many);
    };

    let mut bands = Vec::with_capacity(count);
    let mut start = match axis {
        SplitAxis::Rows => map.min.y,
        SplitAxis::Columns => map.min.x,
    };
    for i in 0..n {
        let last = i.saturating_add(1) == n;
        let end = if last {
            match axis {
                SplitAxis::Rows => map.max.y,
                SplitAxis::Columns => map.max.x,
            }
        } else {
            start.saturating_add(band).saturating_sub(1)
        };
        bands.push(match axis {
            SplitAxis::Rows => GridRect::new(
                Position::new(map.min.x, start),
                Position::new(map.max.x, end),
            ),
            SplitAxis::Columns => GridRect::new(
                Position::new(start, map.min.y),
                Position::new(end, map.max.y),
            ),
        });
        start = end.saturating_add(1);
    }
    Ok(bands)
}

/// Assign bands to agents greedily.
///
/// For each band in order, the unassigned agent closest (Manhattan) to the
/// band's top-left corner takes it; ties go to the earlier agent. Returns
/// the band index for each agent, in agent order.
pub fn assign_bands(bands: &[GridRect], positions: &[Position]) -> Vec<Option<u32>> {
    let mut assigned: Vec<Option<u32>> = vec![None; positions.len()];
    for (band_index, band) in (0_u32..).zip(bands) {
        let closest = positions
            .iter()
            .enumerate()
            .filter(|(agent, _)| assigned.get(*agent).is_some_and(Option::is_none))
            .min_by_key(|(agent, pos)| (pos.manhattan(band.min), *agent))
            .map(|(agent, _)| agent);
        if let Some(slot) = closest.and_then(|agent| assigned.get_mut(agent)) {
            *slot = Some(band_index);
        }
    }
    assigned
}

/// Anchor lattice for a zone in boustrophedon order.
pub fn anchors(rect: GridRect, sensor_range: u32) -> Vec<Position> {
    let xs = axis_anchors(rect.min.x, rect.max.x, sensor_range);
    let ys = axis_anchors(rect.min.y, rect.max.y, sensor_range);
    let mut out = Vec::with_capacity(xs.len().saturating_mul(ys.len()));
    let mut reversed = false;
    for &y in &ys {
        if reversed {
            out.extend(xs.iter().rev().map(|&x| Position::new(x, y)));
        } else {
            out.extend(xs.iter().map(|&x| Position::new(x, y)));
        }
        reversed = !reversed;
    }
    out
}

/// Anchor coordinates along one axis: `min + r + k(2r + 1)`, with the last
/// one pulled back to `max − r`, all clamped into `[min, max]`.
fn axis_anchors(min: i32, max: i32, sensor_range: u32) -> Vec<i32> {
    if max < min {
        return Vec::new();
    }
    let r = i32::try_from(sensor_range).unwrap_or(i32::MAX);
    let spacing = r.saturating_mul(2).saturating_add(1);
    let extent = max.saturating_sub(min).saturating_add(1);
    let count = extent
        .checked_add(spacing.saturating_sub(1))
        .and_then(|n| n.checked_div(spacing))
        .unwrap_or(1)
        .max(1);
    (0..count)
        .map(|k| {
            let raw = if k.saturating_add(1) == count {
                max.saturating_sub(r)
            } else {
                min.saturating_add(r).saturating_add(spacing.saturating_mul(k))
            };
            raw.clamp(min, max)
        })
        .collect()
}

/// Partition the map and build the zone for the agent at `me` in
/// `positions`.
pub fn assign_zone(
    map: GridRect,
    positions: &[Position],
    me: usize,
    sensor_range: u32,
) -> Result<Zone, AgentError> {
    let bands = partition(map, positions.len())?;
    let assignment = assign_bands(&bands, positions);
    let slot = assignment.get(me).copied().flatten();
    let Some((index, rect)) = slot.and_then(|index| {
        let rect = bands.get(usize::try_from(index).ok()?)?;
        Some((index, *rect))
    }) else {
        return Err(AgentError::TooManyAgents {
            agents: positions.len(),
            extent: u32::try_from(bands.len()).unwrap_or(u32::MAX),
        });
    };
    Ok(Zone {
        index,
        rect,
        anchors: anchors(rect, sensor_range),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn wide_map_splits_into_equal_columns() {
        let map = GridRect::from_dimensions(9, 3);
        let positions = [Position::new(0, 0), Position::new(4, 1), Position::new(8, 2)];
        let zones: Vec<Zone> = (0..3)
            .map(|me| assign_zone(map, &positions, me, 1).unwrap())
            .collect();

        for (i, zone) in (0_i32..).zip(&zones) {
            assert_eq!(zone.rect.width(), 3);
            assert_eq!(zone.rect.height(), 3);
            assert_eq!(zone.rect.min.x, i * 3);
            assert_eq!(zone.anchors, vec![Position::new(i * 3 + 1, 1)]);
        }
    }

    #[test]
    fn zones_cover_map_without_overlap() {
        let map = GridRect::from_dimensions(10, 23);
        let bands = partition(map, 4).unwrap();
        assert_eq!(bands.len(), 4);
        let total: u64 = bands.iter().map(GridRect::area).sum();
        assert_eq!(total, map.area());
        for cell in map.cells() {
            assert_eq!(bands.iter().filter(|b| b.contains(cell)).count(), 1);
        }
        // 23 / 4 = 5 rows each, the last absorbs 8.
        assert_eq!(bands.last().map(GridRect::height), Some(8));
    }

    #[test]
    fn square_map_splits_into_rows() {
        assert_eq!(SplitAxis::for_map(&GridRect::from_dimensions(5, 5)), SplitAxis::Rows);
        assert_eq!(SplitAxis::for_map(&GridRect::from_dimensions(6, 5)), SplitAxis::Columns);
    }

    #[test]
    fn greedy_assignment_prefers_nearest_then_earliest() {
        let bands = partition(GridRect::from_dimensions(9, 3), 3).unwrap();
        // Agent 2 sits on band 0; agents 0 and 1 tie for band 1.
        let positions = [Position::new(6, 0), Position::new(6, 0), Position::new(0, 0)];
        let assigned = assign_bands(&bands, &positions);
        assert_eq!(assigned, vec![Some(1), Some(2), Some(0)]);
    }

    #[test]
    fn anchors_snake_through_zone() {
        let rect = GridRect::from_dimensions(7, 7);
        let anchors = anchors(rect, 1);
        assert_eq!(
            anchors,
            vec![
                Position::new(1, 1),
                Position::new(4, 1),
                Position::new(5, 1),
                Position::new(5, 4),
                Position::new(4, 4),
                Position::new(1, 4),
                Position::new(1, 5),
                Position::new(4, 5),
                Position::new(5, 5),
            ]
        );
        // Every cell is within sensor range of some anchor.
        for cell in rect.cells() {
            assert!(anchors.iter().any(|a| GridRect::around(*a, 1).contains(cell)));
        }
    }

    #[test]
    fn narrow_zone_anchors_stay_inside() {
        let rect = GridRect::new(Position::new(3, 0), Position::new(4, 9));
        let anchors = anchors(rect, 3);
        assert!(!anchors.is_empty());
        assert!(anchors.iter().all(|a| rect.contains(*a)));
    }

    #[test]
    fn too_many_agents_is_rejected() {
        let result = partition(GridRect::from_dimensions(4, 2), 5);
        assert!(matches!(result, Err(AgentError::TooManyAgents { agents: 5, .. })));
    }
}
