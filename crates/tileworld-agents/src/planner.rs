//! Shortest-path planning on the believed grid.
//!
//! A* over four-neighbour moves with the Manhattan heuristic. Cells believed
//! to hold an obstacle are impassable; unknown cells are assumed free. The
//! open set is a `BTreeSet` keyed on `(f, insertion sequence, cell)`, which
//! makes expansion order, and therefore the returned path, deterministic.
//!
//! Plans are thrown away and recomputed every tick: goals and obstacle
//! beliefs may have changed since the last one.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tileworld_types::{Direction, GridRect, Position};

/// An ordered sequence of moves from the agent's cell to a goal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
    steps: VecDeque<Direction>,
}

impl Plan {
    /// Number of moves left.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the agent is already at the goal.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The next move, consuming it.
    pub fn next_step(&mut self) -> Option<Direction> {
        self.steps.pop_front()
    }

    /// The moves in order.
    pub fn steps(&self) -> impl Iterator<Item = Direction> + '_ {
        self.steps.iter().copied()
    }
}

/// Find a path from `start` to `goal` inside `bounds`.
///
/// `blocked` reports cells believed impassable. Returns `None` when the goal
/// is off the map, blocked, or enclosed. A goal equal to `start` yields an
/// empty plan.
pub fn plan(
    bounds: GridRect,
    start: Position,
    goal: Position,
    blocked: impl Fn(Position) -> bool,
) -> Option<Plan> {
    if !bounds.contains(goal) || blocked(goal) {
        return None;
    }
    if start == goal {
        return Some(Plan {
            steps: VecDeque::new(),
        });
    }

    let mut open: BTreeSet<(u32, u64, Position)> = BTreeSet::new();
    let mut cost: BTreeMap<Position, u32> = BTreeMap::new();
    let mut prev: BTreeMap<Position, (Position, Direction)> = BTreeMap::new();
    let mut closed: BTreeSet<Position> = BTreeSet::new();
    let mut seq: u64 = 0;

    cost.insert(start, 0);
    open.insert((start.manhattan(goal), seq, start));

    while let Some((_, _, current)) = open.pop_first() {
        if current == goal {
            return Some(Plan {
                steps: reconstruct(&prev, start, goal),
            });
        }
        if !closed.insert(current) {
            continue;
        }
        let Some(&g) = cost.get(&current) else {
            continue;
        };
        let next_g = g.saturating_add(1);

        for direction in Direction::MOVES {
            let next = current.step(direction);
            if !bounds.contains(next) || closed.contains(&next) || blocked(next) {
                continue;
            }
            if cost.get(&next).is_some_and(|&known| known <= next_g) {
                continue;
            }
            cost.insert(next, next_g);
            prev.insert(next, (current, direction));
            seq = seq.saturating_add(1);
            open.insert((next_g.saturating_add(next.manhattan(goal)), seq, next));
        }
    }
    None
}

fn reconstruct(
    prev: &BTreeMap<Position, (Position, Direction)>,
    start: Position,
    goal: Position,
) -> VecDeque<Direction> {
    let mut steps = VecDeque::new();
    let mut current = goal;
    while current != start {
        let Some(&(from, direction)) = prev.get(&current) else {
            break;
        };
        steps.push_front(direction);
        current = from;
    }
    steps
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn walk(start: Position, plan: &Plan) -> Position {
        plan.steps().fold(start, Position::step)
    }

    #[test]
    fn open_grid_plan_matches_manhattan_distance() {
        let bounds = GridRect::from_dimensions(20, 20);
        let start = Position::new(2, 3);
        for goal in [Position::new(17, 11), Position::new(0, 0), Position::new(2, 19)] {
            let plan = plan(bounds, start, goal, |_| false).unwrap();
            assert_eq!(plan.len(), usize::try_from(start.manhattan(goal)).unwrap());
            assert_eq!(walk(start, &plan), goal);
        }
    }

    #[test]
    fn detours_around_obstacles() {
        let bounds = GridRect::from_dimensions(5, 5);
        let wall: BTreeSet<Position> = (0..4).map(|y| Position::new(2, y)).collect();
        let start = Position::new(0, 0);
        let goal = Position::new(4, 0);
        let plan = plan(bounds, start, goal, |p| wall.contains(&p)).unwrap();
        assert_eq!(plan.len(), 12);
        let mut pos = start;
        for step in plan.steps() {
            pos = pos.step(step);
            assert!(!wall.contains(&pos));
        }
        assert_eq!(pos, goal);
    }

    #[test]
    fn enclosed_goal_has_no_path() {
        let bounds = GridRect::from_dimensions(7, 7);
        let goal = Position::new(3, 3);
        let ring: BTreeSet<Position> = Direction::MOVES.iter().map(|&d| goal.step(d)).collect();
        assert!(plan(bounds, Position::new(0, 0), goal, |p| ring.contains(&p)).is_none());
    }

    #[test]
    fn blocked_or_off_map_goal_has_no_path() {
        let bounds = GridRect::from_dimensions(4, 4);
        let goal = Position::new(3, 3);
        assert!(plan(bounds, Position::new(0, 0), goal, |p| p == goal).is_none());
        assert!(plan(bounds, Position::new(0, 0), Position::new(4, 0), |_| false).is_none());
    }

    #[test]
    fn goal_at_start_is_empty_plan() {
        let bounds = GridRect::from_dimensions(4, 4);
        let here = Position::new(1, 1);
        let mut plan = plan(bounds, here, here, |_| false).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.next_step(), None);
    }

    #[test]
    fn plans_are_deterministic() {
        let bounds = GridRect::from_dimensions(10, 10);
        let a = plan(bounds, Position::new(0, 0), Position::new(9, 9), |_| false).unwrap();
        let b = plan(bounds, Position::new(0, 0), Position::new(9, 9), |_| false).unwrap();
        assert_eq!(a, b);
    }
}
