//! Ranked goal pools.
//!
//! Candidate goals are compared by a rank computed once, when the goal
//! enters the pool. The ranking function is injected at construction, so a
//! pool knows nothing about the agent that owns it. Goals of equal rank keep
//! their insertion order.

use tileworld_types::{Position, Target};

use crate::memory::DecayMemory;

/// Distance to `target`, scaled by its remaining lifetime when the scarcity
/// heuristic is on.
///
/// With scarcity on, `d × remaining / horizon`: between two equidistant
/// objects the one closer to expiry ranks first.
pub fn lifetime_weighted_distance(
    memory: &DecayMemory,
    from: Position,
    target: &Target,
    scarcity: bool,
) -> f64 {
    let distance = f64::from(from.manhattan(target.position));
    if !scarcity || memory.horizon() == 0 {
        return distance;
    }
    // Horizons are tick counts far below 2^52.
    #[allow(clippy::cast_precision_loss)]
    let horizon = memory.horizon() as f64;
    distance * memory.estimated_remaining_lifetime(target.position, 1.0) / horizon
}

/// A ranking closure over one agent's memory and position.
pub fn ranker(
    memory: &DecayMemory,
    from: Position,
    scarcity: bool,
) -> impl Fn(&Target) -> f64 + '_ {
    move |target| lifetime_weighted_distance(memory, from, target, scarcity)
}

/// Goals kept in ascending rank order.
pub struct RankedPool<F> {
    entries: Vec<(f64, Target)>,
    rank: F,
}

impl<F> RankedPool<F>
where
    F: Fn(&Target) -> f64,
{
    /// Create an empty pool ordered by `rank`.
    pub const fn new(rank: F) -> Self {
        Self {
            entries: Vec::new(),
            rank,
        }
    }

    /// Add a goal. Duplicates are ignored.
    pub fn insert(&mut self, target: Target) {
        if self.contains(&target) {
            return;
        }
        let rank = (self.rank)(&target);
        let at = self.entries.partition_point(|(r, _)| *r <= rank);
        self.entries.insert(at, (rank, target));
    }

    /// Remove a goal, returning whether it was present.
    pub fn remove(&mut self, target: &Target) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(_, t)| t != target);
        self.entries.len() != before
    }

    /// Whether the goal is in the pool.
    pub fn contains(&self, target: &Target) -> bool {
        self.entries.iter().any(|(_, t)| t == target)
    }

    /// The best-ranked goal.
    pub fn peek(&self) -> Option<&Target> {
        self.entries.first().map(|(_, t)| t)
    }

    /// Goals in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.entries.iter().map(|(_, t)| t)
    }

    /// Number of goals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the pool, yielding goals in rank order.
    pub fn into_targets(self) -> Vec<Target> {
        self.entries.into_iter().map(|(_, t)| t).collect()
    }
}

impl<F> Extend<Target> for RankedPool<F>
where
    F: Fn(&Target) -> f64,
{
    fn extend<I: IntoIterator<Item = Target>>(&mut self, iter: I) {
        for target in iter {
            self.insert(target);
        }
    }
}

impl<F> core::fmt::Debug for RankedPool<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RankedPool")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tileworld_types::{ObjectKind, SensedObject, SensedWindow};

    use super::*;

    fn tile(x: i32, y: i32) -> Target {
        Target::new(ObjectKind::Tile, Position::new(x, y))
    }

    #[test]
    fn pool_orders_by_injected_rank() {
        let origin = Position::new(0, 0);
        let mut pool = RankedPool::new(|t: &Target| f64::from(origin.manhattan(t.position)));
        pool.extend([tile(5, 0), tile(1, 1), tile(3, 0)]);
        let order: Vec<_> = pool.iter().copied().collect();
        assert_eq!(order, vec![tile(1, 1), tile(3, 0), tile(5, 0)]);
        assert_eq!(pool.peek(), Some(&tile(1, 1)));
    }

    #[test]
    fn equal_ranks_keep_insertion_order() {
        let mut pool = RankedPool::new(|_: &Target| 1.0);
        pool.extend([tile(4, 4), tile(0, 0), tile(2, 2)]);
        assert_eq!(pool.into_targets(), vec![tile(4, 4), tile(0, 0), tile(2, 2)]);
    }

    #[test]
    fn duplicates_and_removal() {
        let mut pool = RankedPool::new(|_: &Target| 0.0);
        pool.insert(tile(1, 1));
        pool.insert(tile(1, 1));
        assert_eq!(pool.len(), 1);
        assert!(pool.remove(&tile(1, 1)));
        assert!(!pool.remove(&tile(1, 1)));
        assert!(pool.is_empty());
    }

    #[test]
    fn scarcity_prefers_objects_near_expiry() {
        let mut memory = DecayMemory::new(20, 20, 100, 10);
        memory.decay(0);
        memory.observe(&SensedWindow {
            center: Position::new(5, 5),
            range: 10,
            objects: vec![SensedObject {
                kind: ObjectKind::Tile,
                position: Position::new(4, 0),
            }],
        });
        memory.decay(60);
        memory.observe(&SensedWindow {
            center: Position::new(10, 10),
            range: 10,
            objects: vec![
                SensedObject {
                    kind: ObjectKind::Tile,
                    position: Position::new(4, 0),
                },
                SensedObject {
                    kind: ObjectKind::Tile,
                    position: Position::new(0, 3),
                },
            ],
        });
        let origin = Position::new(0, 0);
        let old = tile(4, 0);
        let fresh = tile(0, 3);

        // Plain distance prefers the nearer tile.
        let plain = lifetime_weighted_distance(&memory, origin, &fresh, false);
        assert!((plain - 3.0).abs() < f64::EPSILON);

        // Scarcity: 4 × 40/100 = 1.6 beats 3 × 100/100 = 3.
        let mut pool = RankedPool::new(ranker(&memory, origin, true));
        pool.extend([fresh, old]);
        assert_eq!(pool.peek(), Some(&old));
        let rank = lifetime_weighted_distance(&memory, origin, &old, true);
        assert!((rank - 1.6).abs() < 1e-9);
    }
}
