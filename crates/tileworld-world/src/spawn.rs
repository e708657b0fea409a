//! Object creation rates and lifetime.
//!
//! Each tick the world creates a random number of tiles, holes, and
//! obstacles. The count for a kind is drawn around its configured mean:
//! a rate is sampled uniformly in `mean ± dev` (clamped at zero), its
//! integer part is created outright, and its fractional part is the
//! probability of one more object.

use rand::Rng;
use serde::Deserialize;

/// Object creation and lifetime parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectConfig {
    /// Mean tiles created per tick.
    #[serde(default = "default_tile_mean")]
    pub tile_mean: f64,
    /// Deviation of tiles created per tick.
    #[serde(default = "default_dev")]
    pub tile_dev: f64,
    /// Mean holes created per tick.
    #[serde(default = "default_hole_mean")]
    pub hole_mean: f64,
    /// Deviation of holes created per tick.
    #[serde(default = "default_dev")]
    pub hole_dev: f64,
    /// Mean obstacles created per tick.
    #[serde(default = "default_obstacle_mean")]
    pub obstacle_mean: f64,
    /// Deviation of obstacles created per tick.
    #[serde(default = "default_dev")]
    pub obstacle_dev: f64,
    /// Ticks an object exists before it disappears.
    #[serde(default = "default_lifetime")]
    pub lifetime: u64,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            tile_mean: default_tile_mean(),
            tile_dev: default_dev(),
            hole_mean: default_hole_mean(),
            hole_dev: default_dev(),
            obstacle_mean: default_obstacle_mean(),
            obstacle_dev: default_dev(),
            lifetime: default_lifetime(),
        }
    }
}

impl ObjectConfig {
    /// A configuration that never creates objects. Useful for hand-built
    /// scenarios.
    pub const fn static_world(lifetime: u64) -> Self {
        Self {
            tile_mean: 0.0,
            tile_dev: 0.0,
            hole_mean: 0.0,
            hole_dev: 0.0,
            obstacle_mean: 0.0,
            obstacle_dev: 0.0,
            lifetime,
        }
    }
}

const fn default_tile_mean() -> f64 {
    0.1
}

const fn default_hole_mean() -> f64 {
    0.1
}

const fn default_obstacle_mean() -> f64 {
    0.1
}

const fn default_dev() -> f64 {
    0.025
}

const fn default_lifetime() -> u64 {
    150
}

/// Draw how many objects to create this tick for a `(mean, dev)` rate.
pub fn sample_count(rng: &mut impl Rng, mean: f64, dev: f64) -> u32 {
    let jitter = if dev > 0.0 {
        rng.random_range(-dev..=dev)
    } else {
        0.0
    };
    let rate = (mean + jitter).max(0.0);
    let whole = rate.floor();
    let fraction = rate - whole;
    // Rates are small per-tick means; anything above u32 range is a config error
    // and saturates.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut count = whole.min(f64::from(u32::MAX)) as u32;
    if fraction > 0.0 && rng.random_bool(fraction) {
        count = count.saturating_add(1);
    }
    count
}
