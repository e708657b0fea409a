//! Configuration loading and typed config structures for the Tileworld
//! simulation.
//!
//! The canonical configuration lives in `tileworld-config.yaml` at the
//! project root; presets for the standard parameter sets live under
//! `config/`. This module defines strongly-typed structs that mirror the YAML
//! structure and provides a loader that reads and validates the file.
//! Every section and field is optional and falls back to its default.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tileworld_agents::AgentConfig;
use tileworld_types::Position;
use tileworld_world::ObjectConfig;

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tileworld-config.yaml";

/// Environment variable that overrides the configuration file path.
pub const CONFIG_PATH_ENV: &str = "TILEWORLD_CONFIG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but cannot drive a simulation.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `tileworld-config.yaml`. Built once at startup
/// and passed by reference; nothing mutates it during a run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Map size, seed, run length, and population.
    #[serde(default)]
    pub world: WorldConfig,

    /// Object creation rates and lifetime.
    #[serde(default)]
    pub objects: ObjectConfig,

    /// Agent sensing, fuel, and coordination parameters.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`SimulationConfig::from_file`] for an existing file.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values the simulation cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        if self.world.x_dimension == 0 || self.world.y_dimension == 0 {
            return invalid("world.x_dimension", "map dimensions must be positive");
        }
        if self.world.agent_count == 0 {
            return invalid("world.agent_count", "at least one agent is required");
        }
        if self.agent.carry_capacity == 0 {
            return invalid("agent.carry_capacity", "must be at least 1");
        }
        if self.agent.sensor_range == 0 {
            return invalid("agent.sensor_range", "must be at least 1");
        }
        if self.agent.decay_horizon == 0 {
            return invalid("agent.decay_horizon", "must be at least 1");
        }
        if self.agent.goal_announce_count == 0 {
            return invalid("agent.goal_announce_count", "must be at least 1");
        }
        if self.agent.fuel_tolerance <= 0.0 || self.agent.fuel_tolerance > 1.0 {
            return invalid("agent.fuel_tolerance", "must lie in (0, 1]");
        }
        if self.objects.lifetime == 0 {
            return invalid("objects.lifetime", "must be at least 1");
        }
        Ok(())
    }
}

/// The configuration file to read: `TILEWORLD_CONFIG` if set, else
/// [`DEFAULT_CONFIG_FILE`].
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Map width in cells.
    #[serde(default = "default_dimension")]
    pub x_dimension: u32,

    /// Map height in cells.
    #[serde(default = "default_dimension")]
    pub y_dimension: u32,

    /// Number of ticks to run.
    #[serde(default = "default_end_time")]
    pub end_time: u64,

    /// Number of agents.
    #[serde(default = "default_agent_count")]
    pub agent_count: u32,

    /// Real-time milliseconds between ticks (0 = as fast as possible).
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Fixed fuel station cell; a random empty cell when absent.
    #[serde(default)]
    pub fuel_station: Option<Position>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            x_dimension: default_dimension(),
            y_dimension: default_dimension(),
            end_time: default_end_time(),
            agent_count: default_agent_count(),
            tick_interval_ms: 0,
            fuel_station: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when
    /// set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

fn default_world_name() -> String {
    "Tileworld".to_owned()
}

const fn default_seed() -> u64 {
    4_162_012
}

const fn default_dimension() -> u32 {
    100
}

const fn default_end_time() -> u64 {
    5000
}

const fn default_agent_count() -> u32 {
    6
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.seed, 4_162_012);
        assert_eq!(config.world.x_dimension, 100);
        assert_eq!(config.world.end_time, 5000);
        assert_eq!(config.agent.default_fuel_level, 500);
        assert_eq!(config.objects.lifetime, 150);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Narrow"
  seed: 9042014
  x_dimension: 150
  y_dimension: 40
  end_time: 200
  agent_count: 4
  tick_interval_ms: 10
  fuel_station: { x: 3, y: 7 }

objects:
  tile_mean: 0.02
  tile_dev: 0.001
  hole_mean: 0.2
  hole_dev: 0.01
  obstacle_mean: 0.5
  obstacle_dev: 0.1
  lifetime: 120

agent:
  default_fuel_level: 1000
  allow_assistance: false
  scarcity_heuristic: false

logging:
  level: "debug"
  format: json
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.name, "Narrow");
        assert_eq!(config.world.x_dimension, 150);
        assert_eq!(config.world.fuel_station, Some(Position::new(3, 7)));
        assert_eq!(config.objects.lifetime, 120);
        assert_eq!(config.agent.default_fuel_level, 1000);
        assert!(!config.agent.allow_assistance);
        // Unset agent fields keep their defaults.
        assert_eq!(config.agent.carry_capacity, 3);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 7\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Seed is overridden
        assert_eq!(config.world.seed, 7);
        // Everything else uses defaults
        assert_eq!(config.world.agent_count, 6);
        assert_eq!(config.agent.sensor_range, 3);
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(SimulationConfig::parse("").ok(), Some(SimulationConfig::default()));
    }

    #[test]
    fn rejects_unusable_values() {
        let result = SimulationConfig::parse("world:\n  agent_count: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "world.agent_count",
                ..
            })
        ));
        let result = SimulationConfig::parse("agent:\n  fuel_tolerance: 1.5\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
        for (yaml, expected) in [
            ("agent:\n  sensor_range: 0\n", "agent.sensor_range"),
            ("agent:\n  decay_horizon: 0\n", "agent.decay_horizon"),
            ("agent:\n  goal_announce_count: 0\n", "agent.goal_announce_count"),
        ] {
            assert!(
                matches!(
                    SimulationConfig::parse(yaml),
                    Err(ConfigError::Invalid { field, .. }) if field == expected
                ),
                "{yaml:?} should be rejected"
            );
        }
        assert!(matches!(
            SimulationConfig::parse("world: [1, 2"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("no-such-config.yaml");
        let config = SimulationConfig::load_or_default(&path);
        assert_eq!(config.ok(), Some(SimulationConfig::default()));
    }

    #[test]
    fn load_project_config_files() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
        let mut paths = vec![root.join(DEFAULT_CONFIG_FILE)];
        for preset in ["parameters3.yaml", "parameters4.yaml", "parameters5.yaml"] {
            paths.push(root.join("config").join(preset));
        }
        for path in paths.iter().filter(|p| p.exists()) {
            let config = SimulationConfig::from_file(path);
            assert!(config.is_ok(), "Failed to load {}: {config:?}", path.display());
        }
    }
}
