//! Configuration loading and typed config structures for the travelers
//! simulation.
//!
//! The configuration lives in `travelers-config.yaml`. Every field has a
//! default, so an empty file (or no file at all) yields the classic 5x5 board
//! with five traps, five travelers and two squatters.

use std::path::Path;

use serde::Deserialize;
use travelers_agents::{SquatterConfig, TravelerConfig};
use travelers_types::GridDimensions;
use travelers_types::ids::SQUATTER_ID_BASE;

/// Environment variable that replaces `world.seed`.
pub const SEED_ENV: &str = "TRAVELERS_SEED";

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "TRAVELERS_CONFIG";

/// Configuration file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "travelers-config.yaml";

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

    /// The values parsed but cannot describe a runnable simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `travelers-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Board size, traps and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Traveler parameters.
    #[serde(default)]
    pub travelers: TravelerConfig,

    /// Squatter parameters.
    #[serde(default)]
    pub squatters: SquatterConfig,

    /// Queue sizes.
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `TRAVELERS_SEED` overrides `world.seed` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the seed override is not a number.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides are
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply environment overrides on top of the parsed values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `TRAVELERS_SEED` is not a `u64`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var(SEED_ENV) {
            self.override_seed(&raw)?;
        }
        Ok(())
    }

    fn override_seed(&mut self, raw: &str) -> Result<(), ConfigError> {
        let seed = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
            reason: format!("{SEED_ENV}={raw:?} is not a u64 seed: {e}"),
        })?;
        self.world.seed = Some(seed);
        Ok(())
    }

    /// Check that the values describe a runnable simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = self.world.dimensions();
        if !dims.is_valid() {
            return invalid(format!("board {dims} has no cells"));
        }
        if u64::from(self.world.traps) > dims.cell_count() {
            return invalid(format!(
                "{} traps do not fit on a {dims} board",
                self.world.traps
            ));
        }

        let t = &self.travelers;
        if t.min_steps > t.max_steps {
            return invalid(format!(
                "travelers.min_steps {} exceeds max_steps {}",
                t.min_steps, t.max_steps
            ));
        }
        if t.min_delay_ms > t.max_delay_ms {
            return invalid(format!(
                "travelers.min_delay_ms {} exceeds max_delay_ms {}",
                t.min_delay_ms, t.max_delay_ms
            ));
        }
        if t.max_attempts == 0 {
            return invalid("travelers.max_attempts must be positive".to_owned());
        }
        if t.count >= SQUATTER_ID_BASE {
            return invalid(format!(
                "travelers.count {} collides with squatter ids starting at {SQUATTER_ID_BASE}",
                t.count
            ));
        }

        let s = &self.squatters;
        if s.max_attempts == 0 {
            return invalid("squatters.max_attempts must be positive".to_owned());
        }
        if s.poll_interval_ms == 0 {
            return invalid("squatters.poll_interval_ms must be positive".to_owned());
        }
        if s.max_squatters >= SQUATTER_ID_BASE {
            return invalid(format!(
                "squatters.max_squatters {} collides with trap ids",
                s.max_squatters
            ));
        }

        if self.runtime.collector_capacity == 0 || self.runtime.cell_mailbox_capacity == 0 {
            return invalid("runtime queue capacities must be positive".to_owned());
        }
        Ok(())
    }

    /// Number of entities announced in the stream header: every traveler,
    /// the squatter cap and every trap.
    pub const fn header_total(&self) -> u32 {
        self.travelers
            .count
            .saturating_add(self.squatters.max_squatters)
            .saturating_add(self.world.traps)
    }
}

fn invalid(reason: String) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid { reason })
}

/// Board configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Columns.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Rows.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Number of trap cells placed at start.
    #[serde(default = "default_traps")]
    pub traps: u32,

    /// Master seed. Unset means a fresh random seed per run.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl WorldConfig {
    /// The board's dimensions.
    pub const fn dimensions(&self) -> GridDimensions {
        GridDimensions::new(self.width, self.height)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            traps: default_traps(),
            seed: None,
        }
    }
}

/// Queue sizes for the actor plumbing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuntimeConfig {
    /// Batches the collector queue holds before agents wait.
    #[serde(default = "default_collector_capacity")]
    pub collector_capacity: usize,

    /// Requests each cell mailbox holds before callers wait.
    #[serde(default = "default_cell_mailbox_capacity")]
    pub cell_mailbox_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            collector_capacity: default_collector_capacity(),
            cell_mailbox_capacity: default_cell_mailbox_capacity(),
        }
    }
}

const fn default_width() -> u32 {
    5
}

const fn default_height() -> u32 {
    5
}

const fn default_traps() -> u32 {
    5
}

const fn default_collector_capacity() -> usize {
    100
}

const fn default_cell_mailbox_capacity() -> usize {
    1
}
