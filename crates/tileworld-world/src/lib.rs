//! The grid environment for the Tileworld simulation.
//!
//! Agents treat the world as an external collaborator: they sense a window
//! around their position and submit validated actions. This crate defines
//! that interface and ships an in-memory implementation with seeded object
//! creation and lifetime expiry.
//!
//! # Modules
//!
//! - [`environment`] -- The [`Environment`] trait agents act against.
//! - [`error`] -- Rejections for invalid actions and placements.
//! - [`grid`] -- [`GridWorld`], the seeded in-memory grid.
//! - [`spawn`] -- Object creation rates, lifetime, and count sampling.

pub mod environment;
pub mod error;
pub mod grid;
pub mod spawn;

// Re-export primary types at crate root.
pub use environment::Environment;
pub use error::WorldError;
pub use grid::{GridWorld, WorldStep};
pub use spawn::{ObjectConfig, sample_count};
