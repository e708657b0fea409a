//! Configuration, tick cycle, and orchestration for the Tileworld
//! simulation.
//!
//! This crate is the scheduler: it owns the world, the agents, and the
//! tick-scoped broadcast channel, and it drives every agent through the
//! broadcast phase and the deliberate-and-act phase once per tick.
//!
//! # Modules
//!
//! - [`channel`] -- The tick-scoped broadcast channel ([`TickChannel`]).
//! - [`config`] -- Configuration loading from `tileworld-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- Shared stop flag and pacing for a run.
//! - [`runner`] -- The bounded async run loop.
//! - [`tick`] -- The per-tick cycle.
//!
//! [`TickChannel`]: channel::TickChannel

pub mod channel;
pub mod config;
pub mod control;
pub mod runner;
pub mod tick;
