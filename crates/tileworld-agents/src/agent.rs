//! The Tileworld agent.
//!
//! An [`Agent`] owns its state, its decaying memory, its zone, and its
//! candidate goals. The scheduler drives it through three calls per tick:
//!
//! 1. [`Agent::broadcast`] ages and refreshes memory from the sensed window,
//!    then publishes MAP, GOALS, and AUCTION messages.
//! 2. [`Agent::think`] assigns a zone on the first tick, merges everything
//!    peers published, picks a mode, and plans one step.
//! 3. [`Agent::act`] submits that step to the environment and reports.
//!
//! Agents never touch each other; all influence flows through messages.

use std::sync::Arc;

use tileworld_types::{
    Action, ActionOutcome, ActionReport, AgentId, Direction, Message, MessageBody, Mode,
    ObjectKind, Outbox, Position, Target, Thought,
};
use tileworld_world::Environment;
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::coordinator::{
    AssistPools, Candidates, PeerView, merge_peer_maps, prepare_offer, strip_announced, survey,
};
use crate::error::AgentError;
use crate::memory::DecayMemory;
use crate::mode::{ModeInputs, exploration_goal, select_mode};
use crate::planner;
use crate::ranking::{lifetime_weighted_distance, ranker};
use crate::zone::{self, Zone};

/// The mutable part of an agent the environment cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentState {
    /// Current cell.
    pub position: Position,
    /// Fuel left. Each move costs one.
    pub fuel: u32,
    /// Tiles in hand.
    pub carried: u32,
    /// Holes filled so far.
    pub score: u32,
    /// Mode chosen on the latest tick.
    pub mode: Mode,
    /// Goal chosen on the latest tick.
    pub goal: Option<Position>,
}

/// One coordinating agent.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    config: Arc<AgentConfig>,
    state: AgentState,
    memory: DecayMemory,
    zone: Option<Zone>,
    candidates: Candidates,
    announced: Vec<Target>,
}

impl Agent {
    /// Create an agent with a full tank on a `width × height` map.
    pub fn new(
        id: AgentId,
        position: Position,
        config: Arc<AgentConfig>,
        width: u32,
        height: u32,
    ) -> Self {
        let memory = DecayMemory::new(width, height, config.decay_horizon, config.sensor_range);
        Self {
            id,
            state: AgentState {
                position,
                fuel: config.default_fuel_level,
                carried: 0,
                score: 0,
                mode: Mode::Explore,
                goal: None,
            },
            config,
            memory,
            zone: None,
            candidates: Candidates::default(),
            announced: Vec::new(),
        }
    }

    /// The agent's identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// The shared configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Position, fuel, load, and score.
    pub const fn state(&self) -> &AgentState {
        &self.state
    }

    /// The agent's private memory.
    pub const fn memory(&self) -> &DecayMemory {
        &self.memory
    }

    /// The agent's zone, once assigned.
    pub const fn zone(&self) -> Option<&Zone> {
        self.zone.as_ref()
    }

    /// Reachable in-zone goals, best first.
    pub const fn candidates(&self) -> &Candidates {
        &self.candidates
    }

    // -------------------------------------------------------------------
    // Phase 1: sense and broadcast
    // -------------------------------------------------------------------

    /// Age memory, sense, and publish this tick's MAP, GOALS, and AUCTION
    /// messages.
    pub fn broadcast<E: Environment>(&mut self, env: &E, outbox: &mut Outbox) {
        let position = self.state.position;
        self.memory.decay(env.now());
        self.memory
            .observe(&env.sense(position, self.config.sensor_range));

        outbox.broadcast(MessageBody::Map {
            snapshot: self.memory.snapshot().clone(),
            position,
        });

        match &self.zone {
            Some(zone) => {
                let offer =
                    prepare_offer(&self.memory, zone, position, self.state.carried, &self.config);
                offer.publish(zone.index, outbox);
                debug!(
                    agent = %self.id,
                    tiles = offer.candidates.tiles.len(),
                    holes = offer.candidates.holes.len(),
                    announced = offer.announce.len(),
                    auctioned = offer.auction_tiles.len().saturating_add(offer.auction_holes.len()),
                    "zone offer published"
                );
                self.announced = offer.announce;
                self.candidates = offer.candidates;
            }
            None => {
                self.announced.clear();
                self.candidates.clear();
            }
        }
    }

    // -------------------------------------------------------------------
    // Phase 2: deliberate
    // -------------------------------------------------------------------

    /// Decide this tick's action from everything published so far.
    ///
    /// Every committed goal is announced through `outbox` before the agent
    /// acts, unless this agent already announced it in the broadcast half.
    pub fn think<E: Environment>(
        &mut self,
        env: &E,
        messages: &[Message],
        outbox: &mut Outbox,
    ) -> Thought {
        let view = PeerView::new(self.id, messages);
        if self.zone.is_none()
            && let Err(err) = self.assign_zone(&view)
        {
            warn!(agent = %self.id, error = %err, "zone assignment deferred");
        }
        merge_peer_maps(&view, &mut self.memory);

        let position = self.state.position;
        let config: &AgentConfig = &self.config;
        let memory = &self.memory;

        // Drop candidates a merged map says are gone.
        let still_there =
            |t: &Target| memory.get(t.position).is_some_and(|p| p.kind == t.kind);
        self.candidates.tiles.retain(still_there);
        self.candidates.holes.retain(still_there);

        let mut pools = AssistPools::new(
            ranker(memory, position, config.scarcity_heuristic),
            ranker(memory, position, config.scarcity_heuristic),
        );
        if let Some(zone) = &self.zone {
            pools.accept(&view, zone, memory, position, config);
        }
        strip_announced(&view.announced(), &mut self.candidates, &mut pools);

        let rank =
            |t: &Target| lifetime_weighted_distance(memory, position, t, config.scarcity_heuristic);
        let inputs = ModeInputs {
            position,
            fuel: self.state.fuel,
            carried: self.state.carried,
            fuel_station: memory.fuel_station(),
            can_fill_here: env.can_fill(position),
            can_pickup_here: env.can_pickup(position),
            best_tile_rank: self.candidates.best_tile().map(rank),
            best_hole_rank: self.candidates.best_hole().map(rank),
            has_assist_tile: !pools.tiles.is_empty(),
            has_assist_hole: !pools.holes.is_empty(),
        };
        let mode = select_mode(&inputs, config);

        let thought = match mode {
            Mode::ReactFill => {
                outbox.announce(vec![Target::new(ObjectKind::Hole, position)]);
                Thought {
                    action: Action::Putdown,
                    mode,
                    goal: Some(position),
                }
            }
            Mode::ReactCollect => {
                outbox.announce(vec![Target::new(ObjectKind::Tile, position)]);
                Thought {
                    action: Action::Pickup,
                    mode,
                    goal: Some(position),
                }
            }
            Mode::Wait => Thought::hold(mode, None),
            Mode::Refuel if inputs.fuel_station == Some(position) => Thought {
                action: Action::Refuel,
                mode,
                goal: Some(position),
            },
            Mode::Explore
            | Mode::Collect
            | Mode::Fill
            | Mode::Refuel
            | Mode::AssistCollect
            | Mode::AssistFill => {
                let goal = match mode {
                    Mode::Refuel => inputs.fuel_station,
                    Mode::Collect | Mode::Fill => {
                        let best = if mode == Mode::Collect {
                            self.candidates.best_tile()
                        } else {
                            self.candidates.best_hole()
                        };
                        let target = best.copied();
                        // A stripped head leaves the agent on a goal it only
                        // auctioned so far.
                        if let Some(target) = target
                            && !self.announced.contains(&target)
                        {
                            outbox.announce(vec![target]);
                            self.announced.push(target);
                        }
                        target.map(|t| t.position)
                    }
                    Mode::AssistCollect | Mode::AssistFill => {
                        let pool = if mode == Mode::AssistCollect {
                            &pools.tiles
                        } else {
                            &pools.holes
                        };
                        let contract = pool.peek().copied();
                        if let Some(target) = contract {
                            outbox.announce(vec![target]);
                        }
                        contract.map(|t| t.position)
                    }
                    _ => match &self.zone {
                        Some(zone) => exploration_goal(memory, &zone.anchors, position),
                        None => exploration_goal(
                            memory,
                            &zone::anchors(memory.bounds(), config.sensor_range),
                            position,
                        ),
                    },
                };
                step_toward(env, memory, position, goal, mode)
            }
        };

        debug!(
            agent = %self.id,
            mode = %mode,
            goal = ?thought.goal,
            action = ?thought.action,
            fuel = self.state.fuel,
            carried = self.state.carried,
            closest_tile = ?memory.closest_sensed(ObjectKind::Tile),
            "decided"
        );
        self.state.mode = mode;
        self.state.goal = thought.goal;
        thought
    }

    /// Partition the map from this tick's MAP broadcasts and take this
    /// agent's band.
    fn assign_zone(&mut self, view: &PeerView<'_>) -> Result<(), AgentError> {
        let broadcasts = view.map_positions();
        let me = broadcasts
            .keys()
            .position(|id| *id == self.id)
            .ok_or(AgentError::ZoneUnavailable { agent: self.id })?;
        let positions: Vec<Position> = broadcasts.values().copied().collect();
        let zone = zone::assign_zone(self.memory.bounds(), &positions, me, self.config.sensor_range)?;
        info!(
            agent = %self.id,
            zone = zone.index,
            min = %zone.rect.min,
            max = %zone.rect.max,
            anchors = zone.anchors.len(),
            "zone assigned"
        );
        let (candidates, _, _) = survey(&self.memory, &zone, self.state.position, &self.config);
        self.candidates = candidates;
        self.zone = Some(zone);
        Ok(())
    }

    // -------------------------------------------------------------------
    // Phase 2: act
    // -------------------------------------------------------------------

    /// Submit the chosen action and report the result.
    ///
    /// A rejected action is logged and reported; the agent does not replan
    /// until the next tick.
    pub fn act<E: Environment>(&mut self, env: &mut E, thought: Thought) -> ActionReport {
        let outcome = if thought.action.is_hold() {
            ActionOutcome::Held
        } else {
            match self.apply(env, thought.action) {
                Ok(()) => ActionOutcome::Succeeded,
                Err(err) => {
                    warn!(
                        agent = %self.id,
                        action = ?thought.action,
                        position = %self.state.position,
                        error = %err,
                        "action rejected"
                    );
                    ActionOutcome::Rejected {
                        reason: err.to_string(),
                    }
                }
            }
        };
        ActionReport {
            agent_id: self.id,
            tick: env.now(),
            mode: thought.mode,
            goal: thought.goal,
            action: thought.action,
            outcome,
            position: self.state.position,
            fuel: self.state.fuel,
            carried: self.state.carried,
            score: self.state.score,
        }
    }

    fn apply<E: Environment>(&mut self, env: &mut E, action: Action) -> Result<(), AgentError> {
        let position = self.state.position;
        match action {
            Action::Move(Direction::Stay) => {}
            Action::Move(direction) => {
                if self.state.fuel == 0 {
                    return Err(AgentError::OutOfFuel);
                }
                self.state.position = env.try_move(position, direction)?;
                self.state.fuel = self.state.fuel.saturating_sub(1);
            }
            Action::Pickup => {
                if self.state.carried >= self.config.carry_capacity {
                    return Err(AgentError::CarryCapacityReached {
                        capacity: self.config.carry_capacity,
                    });
                }
                env.pickup_tile(position)?;
                self.state.carried = self.state.carried.saturating_add(1);
                self.memory.forget(position);
            }
            Action::Putdown => {
                if self.state.carried == 0 {
                    return Err(AgentError::NothingCarried);
                }
                env.fill_hole(position)?;
                self.state.carried = self.state.carried.saturating_sub(1);
                self.state.score = self.state.score.saturating_add(1);
                self.memory.forget(position);
            }
            Action::Refuel => {
                self.state.fuel = env.refuel(position)?;
            }
        }
        Ok(())
    }
}

/// First step of a fresh plan toward `goal`, or hold when there is no goal,
/// the goal is off the map, there is no path, or the agent is already there.
fn step_toward<E: Environment>(
    env: &E,
    memory: &DecayMemory,
    position: Position,
    goal: Option<Position>,
    mode: Mode,
) -> Thought {
    let Some(goal) = goal else {
        return Thought::hold(mode, None);
    };
    if !env.in_bounds(goal) {
        debug!(to = %goal, "goal off the map");
        return Thought::hold(mode, None);
    }
    let next = planner::plan(memory.bounds(), position, goal, |p| memory.is_blocked(p))
        .and_then(|mut plan| plan.next_step());
    match next {
        Some(direction) => Thought {
            action: Action::Move(direction),
            mode,
            goal: Some(goal),
        },
        None => {
            if goal != position {
                debug!(from = %position, to = %goal, "no path");
            }
            Thought::hold(mode, Some(goal))
        }
    }
}
