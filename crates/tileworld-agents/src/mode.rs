//! Priority mode selection and exploration goal choice.
//!
//! The mode is re-derived from scratch every tick; nothing carries over
//! except what the inputs say. Rules are checked in strict priority order:
//!
//! 1. On a fillable hole while carrying: `REACT_FILL`.
//! 2. On a tile with room to carry it: `REACT_COLLECT`.
//! 3. On the station below the opportunistic level: `REFUEL`.
//! 4. Station known and at least `fuel × tolerance` away: `REFUEL`.
//! 5. Station unknown, fuel at or below the floor: `WAIT`.
//! 6. Station unknown: `EXPLORE`.
//! 7. Station known, fuel at or below the floor: `REFUEL`.
//! 8. Empty-handed: `COLLECT`, else `ASSIST_COLLECT`, else `EXPLORE`.
//! 9. Carrying with a hole candidate: `FILL` unless a tile ranks strictly
//!    better and there is still room, then `COLLECT`.
//! 10. Carrying with room and a tile candidate: `COLLECT`.
//! 11. An accepted auction hole: `ASSIST_FILL`.
//! 12. `EXPLORE`.

use std::cmp::Ordering;

use tileworld_types::{GridRect, Mode, Position};

use crate::config::AgentConfig;
use crate::memory::DecayMemory;

/// Everything the selector looks at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModeInputs {
    /// Current cell.
    pub position: Position,
    /// Fuel left.
    pub fuel: u32,
    /// Tiles in hand.
    pub carried: u32,
    /// Known fuel station.
    pub fuel_station: Option<Position>,
    /// The environment accepts a putdown here now.
    pub can_fill_here: bool,
    /// The environment accepts a pickup here now.
    pub can_pickup_here: bool,
    /// Rank of the best tile candidate.
    pub best_tile_rank: Option<f64>,
    /// Rank of the best hole candidate.
    pub best_hole_rank: Option<f64>,
    /// An auctioned tile was accepted.
    pub has_assist_tile: bool,
    /// An auctioned hole was accepted.
    pub has_assist_hole: bool,
}

/// Pick this tick's mode.
pub fn select_mode(inputs: &ModeInputs, config: &AgentConfig) -> Mode {
    let has_room = inputs.carried < config.carry_capacity;

    if inputs.carried > 0 && inputs.can_fill_here {
        return Mode::ReactFill;
    }
    if has_room && inputs.can_pickup_here {
        return Mode::ReactCollect;
    }
    if inputs.fuel_station == Some(inputs.position)
        && f64::from(inputs.fuel) < config.opportunistic_refuel_level()
    {
        return Mode::Refuel;
    }

    let at_floor = inputs.fuel <= config.hard_fuel_limit;
    let Some(station) = inputs.fuel_station else {
        return if at_floor { Mode::Wait } else { Mode::Explore };
    };
    let to_station = f64::from(inputs.position.manhattan(station));
    if to_station >= f64::from(inputs.fuel) * config.fuel_tolerance || at_floor {
        return Mode::Refuel;
    }

    if inputs.carried == 0 {
        return if inputs.best_tile_rank.is_some() {
            Mode::Collect
        } else if config.allow_assistance && inputs.has_assist_tile {
            Mode::AssistCollect
        } else {
            Mode::Explore
        };
    }

    if let Some(hole) = inputs.best_hole_rank {
        let fill = inputs.best_tile_rank.is_none_or(|tile| hole <= tile) || !has_room;
        return if fill { Mode::Fill } else { Mode::Collect };
    }
    if has_room && inputs.best_tile_rank.is_some() {
        return Mode::Collect;
    }
    if config.allow_assistance && inputs.has_assist_hole {
        return Mode::AssistFill;
    }
    Mode::Explore
}

/// The anchor to explore next.
///
/// Picks the anchor with the highest exploration score; on a tie the one
/// nearer to `position` than the current pick wins. An anchor believed
/// blocked is swapped for the best unblocked cell around it.
pub fn exploration_goal(
    memory: &DecayMemory,
    anchors: &[Position],
    position: Position,
) -> Option<Position> {
    let mut best: Option<(f64, Position)> = None;
    for &anchor in anchors {
        let score = memory.anchor_exploration_score(anchor);
        let better = best.is_none_or(|(best_score, goal)| {
            match score.total_cmp(&best_score) {
                Ordering::Greater => true,
                Ordering::Equal => position.manhattan(anchor) < position.manhattan(goal),
                Ordering::Less => false,
            }
        });
        if better {
            let goal = if memory.is_blocked(anchor) {
                unblocked_neighbour(memory, anchor).unwrap_or(anchor)
            } else {
                anchor
            };
            best = Some((score, goal));
        }
    }
    best.map(|(_, goal)| goal)
}

/// Best-scoring unblocked on-map cell in the 3×3 block around `anchor`.
/// The first cell enumerated wins ties.
fn unblocked_neighbour(memory: &DecayMemory, anchor: Position) -> Option<Position> {
    let bounds = memory.bounds();
    GridRect::around(anchor, 1)
        .cells()
        .filter(|&cell| bounds.contains(cell) && !memory.is_blocked(cell))
        .map(|cell| (memory.anchor_exploration_score(cell), cell))
        .fold(None, |best: Option<(f64, Position)>, (score, cell)| match best {
            Some((best_score, _)) if score.total_cmp(&best_score) != Ordering::Greater => best,
            _ => Some((score, cell)),
        })
        .map(|(_, cell)| cell)
}
