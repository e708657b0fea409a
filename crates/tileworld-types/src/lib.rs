//! Shared type definitions for the Tileworld coordination core.
//!
//! This crate is the single source of truth for the value types that flow
//! between the environment, the agents, and the scheduler.
//!
//! # Modules
//!
//! - [`ids`] -- Agent and run identifiers
//! - [`enums`] -- Object kinds, agent modes, broadcast topics
//! - [`geometry`] -- Positions, move directions, rectangles
//! - [`percept`] -- Percepts, sensed windows, targets, the percept grid
//! - [`message`] -- Broadcast messages and the append-only outbox
//! - [`actions`] -- Actions, thoughts, and per-tick action reports

pub mod actions;
pub mod enums;
pub mod geometry;
pub mod ids;
pub mod message;
pub mod percept;

// Re-export all public types at crate root for convenience.
pub use actions::{Action, ActionOutcome, ActionReport, Thought};
pub use enums::{Mode, ObjectKind, Topic};
pub use geometry::{Direction, GridRect, Position};
pub use ids::{AgentId, RunId};
pub use message::{Message, MessageBody, Outbox, Recipient};
pub use percept::{Percept, PerceptGrid, SensedObject, SensedWindow, Target};
