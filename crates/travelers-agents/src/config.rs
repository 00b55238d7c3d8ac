//! Tunables for traveler and squatter behaviour.
//!
//! Both structs deserialize from the `travelers` and `squatters` sections of
//! `travelers-config.yaml`; every field has a default, so a partial section
//! is valid. Durations are whole milliseconds.

use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

/// Traveler parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TravelerConfig {
    /// Number of travelers to run.
    #[serde(default = "default_traveler_count")]
    pub count: u32,

    /// Smallest step budget.
    #[serde(default = "default_min_steps")]
    pub min_steps: u32,

    /// Largest step budget.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Shortest pause before each step.
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Longest pause before each step.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Reservation attempts per step; the start search allows this many per
    /// cell of the board.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause after a denied reservation.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// How long a traveler killed on its starting cell keeps holding it.
    #[serde(default = "default_start_trap_hold_ms")]
    pub start_trap_hold_ms: u64,

    /// Pause between stepping onto a trap and dying.
    #[serde(default = "default_trap_entry_delay_ms")]
    pub trap_entry_delay_ms: u64,

    /// How long a traveler killed mid-walk keeps holding the trap.
    #[serde(default = "default_trap_hold_ms")]
    pub trap_hold_ms: u64,
}

impl Default for TravelerConfig {
    fn default() -> Self {
        Self {
            count: default_traveler_count(),
            min_steps: default_min_steps(),
            max_steps: default_max_steps(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            start_trap_hold_ms: default_start_trap_hold_ms(),
            trap_entry_delay_ms: default_trap_entry_delay_ms(),
            trap_hold_ms: default_trap_hold_ms(),
        }
    }
}

impl TravelerConfig {
    /// Draw a step budget uniformly from `[min_steps, max_steps]`.
    pub fn draw_steps<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.random_range(self.min_steps..=self.max_steps.max(self.min_steps))
    }

    /// Draw a per-step pause uniformly from `[min_delay_ms, max_delay_ms]`.
    pub fn draw_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let ms = rng.random_range(self.min_delay_ms..=self.max_delay_ms.max(self.min_delay_ms));
        Duration::from_millis(ms)
    }
}

/// Squatter parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SquatterConfig {
    /// Maximum number of squatters spawned over a run.
    #[serde(default = "default_max_squatters")]
    pub max_squatters: u32,

    /// Pause between two squatter spawns.
    #[serde(default = "default_spawn_interval_ms")]
    pub spawn_interval_ms: u64,

    /// Time a squatter stays on the board before leaving on its own.
    #[serde(default = "default_lifetime_ms")]
    pub lifetime_ms: u64,

    /// Longest wait for a kick before the lifetime is re-checked.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Lifetime consumed by handling one kick.
    #[serde(default = "default_kick_penalty_ms")]
    pub kick_penalty_ms: u64,

    /// Spot-search attempts per cell of the board.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause after a denied reservation while searching.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// How long a squatter that walked into a trap keeps holding it.
    #[serde(default = "default_trap_hold_ms")]
    pub trap_hold_ms: u64,
}

impl Default for SquatterConfig {
    fn default() -> Self {
        Self {
            max_squatters: default_max_squatters(),
            spawn_interval_ms: default_spawn_interval_ms(),
            lifetime_ms: default_lifetime_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            kick_penalty_ms: default_kick_penalty_ms(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            trap_hold_ms: default_trap_hold_ms(),
        }
    }
}

/// Attempt budget scaled by board size, as used by both start searches.
pub(crate) fn search_budget(max_attempts: u32, cell_count: u64) -> u64 {
    u64::from(max_attempts).saturating_mul(cell_count)
}

const fn default_traveler_count() -> u32 {
    5
}

const fn default_min_steps() -> u32 {
    10
}

const fn default_max_steps() -> u32 {
    100
}

const fn default_min_delay_ms() -> u64 {
    10
}

const fn default_max_delay_ms() -> u64 {
    50
}

const fn default_max_attempts() -> u32 {
    10
}

const fn default_retry_backoff_ms() -> u64 {
    1
}

const fn default_start_trap_hold_ms() -> u64 {
    2000
}

const fn default_trap_entry_delay_ms() -> u64 {
    30
}

const fn default_trap_hold_ms() -> u64 {
    200
}

const fn default_max_squatters() -> u32 {
    2
}

const fn default_spawn_interval_ms() -> u64 {
    1000
}

const fn default_lifetime_ms() -> u64 {
    1500
}

const fn default_poll_interval_ms() -> u64 {
    10
}

const fn default_kick_penalty_ms() -> u64 {
    10
}
