//! Broadcast coordination: map sharing, goal announcement, and auctions.
//!
//! Each tick runs in two halves. In the broadcast half every agent publishes
//! its percept snapshot (MAP), announces the goals it keeps for itself
//! (GOALS), and auctions the surplus of its zone (AUCTION_TILE and
//! AUCTION_HOLE, tagged with the zone index). In the receive half each agent
//! merges peer maps, accepts auctioned work from nearby zones while it is
//! still reachable, and strips every goal a peer announced from its own
//! candidates and assist pools.
//!
//! Collisions are avoided by ordering, not locking. Two agents can still
//! commit to the same target in one tick when neither has seen the other's
//! announcement yet; the loser finds the target gone on a later tick.

use std::collections::{BTreeMap, BTreeSet};

use tileworld_types::{
    AgentId, Message, MessageBody, ObjectKind, Outbox, PerceptGrid, Position, Recipient, Target,
};
use tracing::debug;

use crate::config::AgentConfig;
use crate::memory::DecayMemory;
use crate::ranking::{RankedPool, ranker};
use crate::zone::Zone;

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// Reachable in-zone goals, best first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Tiles worth collecting.
    pub tiles: Vec<Target>,
    /// Holes worth filling.
    pub holes: Vec<Target>,
}

impl Candidates {
    /// The best tile.
    pub fn best_tile(&self) -> Option<&Target> {
        self.tiles.first()
    }

    /// The best hole.
    pub fn best_hole(&self) -> Option<&Target> {
        self.holes.first()
    }

    /// Drop a goal from whichever list holds it.
    pub fn remove(&mut self, target: &Target) -> bool {
        let list = match target.kind {
            ObjectKind::Tile => &mut self.tiles,
            ObjectKind::Hole => &mut self.holes,
            ObjectKind::Obstacle | ObjectKind::FuelStation => return false,
        };
        let before = list.len();
        list.retain(|t| t != target);
        list.len() != before
    }

    /// Whether the goal is held.
    pub fn contains(&self, target: &Target) -> bool {
        self.tiles.contains(target) || self.holes.contains(target)
    }

    /// Forget every goal.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.holes.clear();
    }
}

/// What an agent publishes about its zone this tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Offer {
    /// Goals kept as private candidates.
    pub candidates: Candidates,
    /// Goals announced as taken.
    pub announce: Vec<Target>,
    /// Tiles offered to neighbouring zones.
    pub auction_tiles: Vec<Target>,
    /// Holes offered to neighbouring zones.
    pub auction_holes: Vec<Target>,
}

impl Offer {
    /// Append the GOALS and AUCTION messages to `outbox`. Empty lists are
    /// not sent.
    pub fn publish(&self, zone: u32, outbox: &mut Outbox) {
        outbox.announce(self.announce.clone());
        if !self.auction_tiles.is_empty() {
            outbox.broadcast(MessageBody::AuctionTile {
                items: self.auction_tiles.clone(),
                zone,
            });
        }
        if !self.auction_holes.is_empty() {
            outbox.broadcast(MessageBody::AuctionHole {
                items: self.auction_holes.clone(),
                zone,
            });
        }
    }
}

/// Split the remembered tiles and holes of a zone into reachable candidates
/// and goals that will expire before the agent gets there.
///
/// Both lists come back ranked by lifetime-weighted distance.
pub fn survey(
    memory: &DecayMemory,
    zone: &Zone,
    position: Position,
    config: &AgentConfig,
) -> (Candidates, Vec<Target>, Vec<Target>) {
    let split = |kind: ObjectKind| {
        let mut pool = RankedPool::new(ranker(memory, position, config.scarcity_heuristic));
        pool.extend(memory.objects_in_zone(zone.rect, kind));
        pool.into_targets().into_iter().partition::<Vec<_>, _>(|t| {
            memory.is_reachable(
                t.position,
                position.manhattan(t.position),
                config.object_lifetime_threshold,
            )
        })
    };
    let (tiles, late_tiles) = split(ObjectKind::Tile);
    let (holes, late_holes) = split(ObjectKind::Hole);
    (Candidates { tiles, holes }, late_tiles, late_holes)
}

/// Decide which of the zone's goals to keep, announce, and auction.
///
/// Of the reachable goals, the first `goal_announce_count` per kind are
/// announced: tiles while the projected load stays under capacity, holes
/// while a tile is projected to be in hand. Everything else reachable stays
/// a private candidate and is also auctioned; unreachable goals are only
/// auctioned.
///
/// The quota is exact: with `goal_announce_count = 1` only the head of each
/// list is announced, never the first two.
pub fn prepare_offer(
    memory: &DecayMemory,
    zone: &Zone,
    position: Position,
    carried: u32,
    config: &AgentConfig,
) -> Offer {
    let (candidates, mut auction_tiles, mut auction_holes) =
        survey(memory, zone, position, config);
    let quota = config.goal_announce_count;
    let mut projected = carried;
    let mut announce = Vec::new();

    for (i, tile) in candidates.tiles.iter().enumerate() {
        if projected >= config.carry_capacity || i >= quota {
            auction_tiles.push(*tile);
        } else {
            projected = projected.saturating_add(1);
            announce.push(*tile);
        }
    }
    for (i, hole) in candidates.holes.iter().enumerate() {
        if projected == 0 || i >= quota {
            auction_holes.push(*hole);
        } else {
            projected = projected.saturating_sub(1);
            announce.push(*hole);
        }
    }

    Offer {
        candidates,
        announce,
        auction_tiles,
        auction_holes,
    }
}

// ---------------------------------------------------------------------------
// Receiving
// ---------------------------------------------------------------------------

/// One agent's read-only view of the tick channel.
#[derive(Debug, Clone, Copy)]
pub struct PeerView<'a> {
    me: AgentId,
    messages: &'a [Message],
}

impl<'a> PeerView<'a> {
    /// View `messages` as agent `me`.
    pub const fn new(me: AgentId, messages: &'a [Message]) -> Self {
        Self { me, messages }
    }

    fn from_peers(&self) -> impl Iterator<Item = &'a Message> + '_ {
        self.messages.iter().filter(|m| m.is_for_peer(self.me))
    }

    /// Every position broadcast in a MAP message this tick, own included,
    /// keyed by sender.
    pub fn map_positions(&self) -> BTreeMap<AgentId, Position> {
        self.messages
            .iter()
            .filter(|m| m.recipient == Recipient::All)
            .filter_map(|m| match &m.body {
                MessageBody::Map { position, .. } => Some((m.sender, *position)),
                _ => None,
            })
            .collect()
    }

    /// Peer snapshots with the position each was sensed from.
    pub fn peer_maps(&self) -> impl Iterator<Item = (&'a PerceptGrid, Position)> + '_ {
        self.from_peers().filter_map(|m| match &m.body {
            MessageBody::Map { snapshot, position } => Some((snapshot, *position)),
            _ => None,
        })
    }

    /// Peer auction lots: `(kind, items, zone)`.
    pub fn auctions(&self) -> impl Iterator<Item = (ObjectKind, &'a [Target], u32)> + '_ {
        self.from_peers().filter_map(|m| match &m.body {
            MessageBody::AuctionTile { items, zone } => {
                Some((ObjectKind::Tile, items.as_slice(), *zone))
            }
            MessageBody::AuctionHole { items, zone } => {
                Some((ObjectKind::Hole, items.as_slice(), *zone))
            }
            _ => None,
        })
    }

    /// Every goal peers announced this tick.
    pub fn announced(&self) -> BTreeSet<Target> {
        self.from_peers()
            .filter_map(|m| match &m.body {
                MessageBody::Goals { targets } => Some(targets.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

/// Merge every peer snapshot into `memory`. Returns the number merged.
pub fn merge_peer_maps(view: &PeerView<'_>, memory: &mut DecayMemory) -> usize {
    let mut merged: usize = 0;
    for (snapshot, position) in view.peer_maps() {
        memory.merge(snapshot, position);
        merged = merged.saturating_add(1);
    }
    merged
}

/// Auctioned goals this agent accepted, best first.
pub struct AssistPools<F> {
    /// Tiles from neighbouring zones.
    pub tiles: RankedPool<F>,
    /// Holes from neighbouring zones.
    pub holes: RankedPool<F>,
}

impl<F> AssistPools<F>
where
    F: Fn(&Target) -> f64,
{
    /// Empty pools ranked by the given functions.
    pub const fn new(tiles: F, holes: F) -> Self {
        Self {
            tiles: RankedPool::new(tiles),
            holes: RankedPool::new(holes),
        }
    }

    /// Accept lots from zones within `max_assist_zone_distance` of `own`
    /// (but not `own` itself) whose items are still reachable in time.
    pub fn accept(
        &mut self,
        view: &PeerView<'_>,
        own: &Zone,
        memory: &DecayMemory,
        position: Position,
        config: &AgentConfig,
    ) {
        for (kind, items, zone) in view.auctions() {
            if zone == own.index || own.distance_to(zone) > config.max_assist_zone_distance {
                continue;
            }
            let pool = match kind {
                ObjectKind::Tile => &mut self.tiles,
                ObjectKind::Hole => &mut self.holes,
                ObjectKind::Obstacle | ObjectKind::FuelStation => continue,
            };
            for item in items.iter().filter(|t| t.kind == kind) {
                let distance = position.manhattan(item.position);
                if memory.is_reachable(item.position, distance, config.object_lifetime_threshold) {
                    pool.insert(*item);
                }
            }
        }
    }

    /// Remove a goal from both pools.
    pub fn remove(&mut self, target: &Target) -> bool {
        let tile = self.tiles.remove(target);
        let hole = self.holes.remove(target);
        tile || hole
    }
}

/// Strip every announced goal from the candidates and assist pools.
/// Returns the number of goals removed.
pub fn strip_announced<F>(
    announced: &BTreeSet<Target>,
    candidates: &mut Candidates,
    pools: &mut AssistPools<F>,
) -> usize
where
    F: Fn(&Target) -> f64,
{
    let mut stripped: usize = 0;
    for target in announced {
        let from_candidates = candidates.remove(target);
        let from_pools = pools.remove(target);
        if from_candidates || from_pools {
            stripped = stripped.saturating_add(1);
        }
    }
    if stripped > 0 {
        debug!(stripped, "announced goals removed");
    }
    stripped
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use tileworld_types::{SensedObject, SensedWindow};

    use super::*;
    use crate::zone::assign_zone;

    fn tile(x: i32, y: i32) -> Target {
        Target::new(ObjectKind::Tile, Position::new(x, y))
    }

    fn hole(x: i32, y: i32) -> Target {
        Target::new(ObjectKind::Hole, Position::new(x, y))
    }

    fn seen(memory: &mut DecayMemory, center: Position, range: u32, objects: &[Target]) {
        memory.observe(&SensedWindow {
            center,
            range,
            objects: objects
                .iter()
                .map(|t| SensedObject {
                    kind: t.kind,
                    position: t.position,
                })
                .collect(),
        });
    }

    fn config() -> AgentConfig {
        AgentConfig {
            sensor_range: 1,
            decay_horizon: 50,
            scarcity_heuristic: false,
            ..AgentConfig::default()
        }
    }

    fn zone(index: u32) -> Zone {
        let map = tileworld_types::GridRect::from_dimensions(9, 3);
        let positions = [Position::new(0, 0), Position::new(3, 0), Position::new(6, 0)];
        let zone = assign_zone(map, &positions, usize::try_from(index).unwrap(), 1).unwrap();
        assert_eq!(zone.index, index);
        zone
    }

    #[test]
    fn offer_announces_quota_and_auctions_surplus() {
        let config = config();
        let mut memory = DecayMemory::new(9, 3, 50, 1);
        memory.decay(0);
        seen(&mut memory, Position::new(1, 1), 1, &[tile(0, 0), tile(2, 2), hole(1, 0)]);

        let offer = prepare_offer(&memory, &zone(0), Position::new(0, 1), 0, &config);
        assert_eq!(offer.candidates.tiles, vec![tile(0, 0), tile(2, 2)]);
        // Nearest tile is announced, the other auctioned; the hole is
        // announced because a tile is projected to be in hand.
        assert_eq!(offer.announce, vec![tile(0, 0), hole(1, 0)]);
        assert_eq!(offer.auction_tiles, vec![tile(2, 2)]);
        assert!(offer.auction_holes.is_empty());
    }

    #[test]
    fn full_load_auctions_every_tile() {
        let config = config();
        let mut memory = DecayMemory::new(9, 3, 50, 1);
        memory.decay(0);
        seen(&mut memory, Position::new(1, 1), 1, &[tile(0, 0)]);
        let offer = prepare_offer(&memory, &zone(0), Position::new(1, 1), 3, &config);
        assert!(offer.announce.is_empty());
        assert_eq!(offer.auction_tiles, vec![tile(0, 0)]);
        assert_eq!(offer.candidates.tiles, vec![tile(0, 0)]);
    }

    #[test]
    fn expiring_goals_are_auctioned_not_kept() {
        let config = config();
        let mut memory = DecayMemory::new(9, 3, 50, 1);
        memory.decay(0);
        seen(&mut memory, Position::new(1, 1), 1, &[tile(2, 2)]);
        memory.decay(49);
        let offer = prepare_offer(&memory, &zone(0), Position::new(0, 0), 0, &config);
        assert!(offer.candidates.tiles.is_empty());
        assert_eq!(offer.auction_tiles, vec![tile(2, 2)]);
    }

    #[test]
    fn publish_skips_empty_lists() {
        let mut outbox = Outbox::new(AgentId::new(0));
        Offer::default().publish(0, &mut outbox);
        assert!(outbox.is_empty());

        let offer = Offer {
            auction_holes: vec![hole(1, 1)],
            ..Offer::default()
        };
        offer.publish(2, &mut outbox);
        assert_eq!(outbox.len(), 1);
        assert!(matches!(
            outbox.messages().first().map(|m| &m.body),
            Some(MessageBody::AuctionHole { zone: 2, .. })
        ));
    }

    #[test]
    fn contracts_from_near_zones_only() {
        let config = config();
        let mut memory = DecayMemory::new(9, 3, 50, 1);
        memory.decay(0);
        let me = AgentId::new(1);
        let mut channel = Vec::new();
        for (sender, zone) in [(0, 0_u32), (2, 2), (1, 1)] {
            let mut outbox = Outbox::new(AgentId::new(sender));
            outbox.broadcast(MessageBody::AuctionTile {
                items: vec![tile(i32::try_from(zone).unwrap() * 3, 1)],
                zone,
            });
            channel.extend(outbox.into_messages());
        }
        // Items must be remembered to be judged reachable.
        for x in [0, 3, 6] {
            seen(&mut memory, Position::new(x, 1), 0, &[tile(x, 1)]);
        }

        let view = PeerView::new(me, &channel);
        let position = Position::new(4, 1);
        let rank = |t: &Target| f64::from(position.manhattan(t.position));
        let mut pools = AssistPools::new(rank, rank);
        pools.accept(&view, &zone(1), &memory, position, &config);
        let accepted: Vec<_> = pools.tiles.iter().copied().collect();
        assert_eq!(accepted, vec![tile(6, 1), tile(0, 1)]);
        assert!(pools.holes.is_empty());
    }

    #[test]
    fn announced_goals_are_stripped_everywhere() {
        let me = AgentId::new(0);
        let mut peer = Outbox::new(AgentId::new(1));
        peer.announce(vec![tile(1, 1), hole(2, 2)]);
        let mut own = Outbox::new(me);
        own.announce(vec![tile(5, 5)]);
        let mut channel = peer.into_messages();
        channel.extend(own.into_messages());

        let view = PeerView::new(me, &channel);
        let announced = view.announced();
        assert_eq!(announced.len(), 2);

        let mut candidates = Candidates {
            tiles: vec![tile(1, 1), tile(5, 5)],
            holes: vec![hole(2, 2)],
        };
        let flat = |_: &Target| 0.0;
        let mut pools = AssistPools::new(flat, flat);
        pools.holes.insert(hole(2, 2));
        pools.tiles.insert(tile(3, 3));

        let stripped = strip_announced(&announced, &mut candidates, &mut pools);
        assert_eq!(stripped, 2);
        for target in &announced {
            assert!(!candidates.contains(target));
            assert!(!pools.tiles.contains(target) && !pools.holes.contains(target));
        }
        // Own announcements never strip own goals.
        assert_eq!(candidates.tiles, vec![tile(5, 5)]);
        assert_eq!(pools.tiles.len(), 1);
    }

    #[test]
    fn map_positions_include_own_broadcast() {
        let mut channel = Vec::new();
        for i in [2_u32, 0, 1] {
            let mut outbox = Outbox::new(AgentId::new(i));
            outbox.broadcast(MessageBody::Map {
                snapshot: PerceptGrid::new(1, 1),
                position: Position::new(i32::try_from(i).unwrap(), 0),
            });
            channel.extend(outbox.into_messages());
        }
        let view = PeerView::new(AgentId::new(0), &channel);
        let positions: Vec<_> = view.map_positions().into_iter().collect();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions.first(), Some(&(AgentId::new(0), Position::new(0, 0))));
        assert_eq!(view.peer_maps().count(), 2);
    }

    #[test]
    fn merging_peer_maps_updates_memory() {
        let mut memory = DecayMemory::new(9, 3, 50, 1);
        memory.decay(3);
        let mut snapshot = PerceptGrid::new(9, 3);
        let obstacle = Position::new(7, 1);
        snapshot.set(
            obstacle,
            Some(tileworld_types::Percept::new(ObjectKind::Obstacle, obstacle, 3)),
        );
        let mut outbox = Outbox::new(AgentId::new(2));
        outbox.broadcast(MessageBody::Map {
            snapshot,
            position: Position::new(7, 1),
        });
        let channel = outbox.into_messages();
        let view = PeerView::new(AgentId::new(0), &channel);
        assert_eq!(merge_peer_maps(&view, &mut memory), 1);
        assert!(memory.is_blocked(obstacle));
    }
}
