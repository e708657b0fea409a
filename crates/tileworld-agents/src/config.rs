//! Tunable parameters for agent deliberation.
//!
//! These values correspond to the `agent` section of
//! `tileworld-config.yaml`. The [`AgentConfig`] struct bundles every
//! tunable so that callers (tick cycle, tests) can override defaults. One
//! value is built at startup and shared read-only by every agent for the
//! lifetime of a run.

use serde::Deserialize;

/// Configuration for agent sensing, fuel management, and coordination.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentConfig {
    /// Fuel an agent starts with and refuels to (default: 500).
    #[serde(default = "default_fuel_level")]
    pub default_fuel_level: u32,

    /// Chebyshev radius of the sensed window (default: 3).
    #[serde(default = "default_sensor_range")]
    pub sensor_range: u32,

    /// Maximum tiles carried at once (default: 3).
    #[serde(default = "default_carry_capacity")]
    pub carry_capacity: u32,

    /// Head back to the station once its distance reaches
    /// `fuel * fuel_tolerance` (default: 0.95).
    ///
    /// Higher values leave less spare fuel for detours around obstacles.
    #[serde(default = "default_fuel_tolerance")]
    pub fuel_tolerance: f64,

    /// Fuel floor below which the agent stops all other work (default: 100).
    #[serde(default = "default_hard_fuel_limit")]
    pub hard_fuel_limit: u32,

    /// Standing on the station below this fraction of
    /// `default_fuel_level` triggers a top-up (default: 0.75).
    #[serde(default = "default_opportunistic_refuel_fraction")]
    pub opportunistic_refuel_fraction: f64,

    /// Weight candidate distances by remaining lifetime (default: true).
    #[serde(default = "default_scarcity_heuristic")]
    pub scarcity_heuristic: bool,

    /// Fraction of the decay horizon used when judging whether an object
    /// can still be reached in time (default: 1.0).
    #[serde(default = "default_object_lifetime_threshold")]
    pub object_lifetime_threshold: f64,

    /// Goals per object kind announced each tick (default: 1).
    ///
    /// Reserving too many starves neighbours of work; too few lets an
    /// assisting agent collide with the owner's next goal.
    #[serde(default = "default_goal_announce_count")]
    pub goal_announce_count: usize,

    /// Accept auctioned work from neighbouring zones (default: true).
    #[serde(default = "default_allow_assistance")]
    pub allow_assistance: bool,

    /// Furthest zone, in zone indices, an agent travels to assist
    /// (default: 1).
    #[serde(default = "default_max_assist_zone_distance")]
    pub max_assist_zone_distance: u32,

    /// Ticks after which a remembered object is forgotten (default: 150).
    #[serde(default = "default_decay_horizon")]
    pub decay_horizon: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            default_fuel_level: default_fuel_level(),
            sensor_range: default_sensor_range(),
            carry_capacity: default_carry_capacity(),
            fuel_tolerance: default_fuel_tolerance(),
            hard_fuel_limit: default_hard_fuel_limit(),
            opportunistic_refuel_fraction: default_opportunistic_refuel_fraction(),
            scarcity_heuristic: default_scarcity_heuristic(),
            object_lifetime_threshold: default_object_lifetime_threshold(),
            goal_announce_count: default_goal_announce_count(),
            allow_assistance: default_allow_assistance(),
            max_assist_zone_distance: default_max_assist_zone_distance(),
            decay_horizon: default_decay_horizon(),
        }
    }
}

impl AgentConfig {
    /// Fuel below which an agent standing on the station refuels anyway.
    pub fn opportunistic_refuel_level(&self) -> f64 {
        f64::from(self.default_fuel_level) * self.opportunistic_refuel_fraction
    }
}

const fn default_fuel_level() -> u32 {
    500
}

const fn default_sensor_range() -> u32 {
    3
}

const fn default_carry_capacity() -> u32 {
    3
}

const fn default_fuel_tolerance() -> f64 {
    0.95
}

const fn default_hard_fuel_limit() -> u32 {
    100
}

const fn default_opportunistic_refuel_fraction() -> f64 {
    0.75
}

const fn default_scarcity_heuristic() -> bool {
    true
}

const fn default_object_lifetime_threshold() -> f64 {
    1.0
}

const fn default_goal_announce_count() -> usize {
    1
}

const fn default_allow_assistance() -> bool {
    true
}

const fn default_max_assist_zone_distance() -> u32 {
    1
}

const fn default_decay_horizon() -> u64 {
    150
}
