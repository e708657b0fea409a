//! Agent deliberation for the Tileworld simulation.
//!
//! This crate holds everything an agent decides on its own: what it remembers,
//! which part of the map it patrols, which goals it keeps, announces, or
//! auctions, which mode it is in, and how it gets where it is going. It sits
//! between `tileworld-types` (the shared data structures) and
//! `tileworld-core` (the tick scheduler). The world itself is only reached
//! through the [`tileworld_world::Environment`] trait.
//!
//! # Modules
//!
//! - [`agent`] -- The agent and its per-tick broadcast, think, act cycle ([`Agent`])
//! - [`config`] -- Agent parameters ([`AgentConfig`])
//! - [`coordinator`] -- Goal announcement, auctions, and peer message handling
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`memory`] -- Decaying percept memory and exploration scores ([`DecayMemory`])
//! - [`mode`] -- Priority mode selection and exploration goals
//! - [`planner`] -- A* path planning on the believed grid
//! - [`ranking`] -- Lifetime-weighted goal ranking ([`RankedPool`])
//! - [`zone`] -- Static zone partitioning and anchor layout ([`Zone`])

pub mod agent;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod memory;
pub mod mode;
pub mod planner;
pub mod ranking;
pub mod zone;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, AgentState};
pub use config::AgentConfig;
pub use coordinator::{AssistPools, Candidates, Offer, PeerView};
pub use error::AgentError;
pub use memory::DecayMemory;
pub use mode::{ModeInputs, exploration_goal, select_mode};
pub use planner::{Plan, plan};
pub use ranking::{RankedPool, lifetime_weighted_distance};
pub use zone::{SplitAxis, Zone, assign_zone};
