//! Traveler and squatter processes for the travelers grid simulation.
//!
//! Agents never share memory and never talk to each other. Each one is an
//! independent task that reserves and releases cells through their
//! [`CellHandle`]s, keeps a private [`EventLog`], and hands that log to the
//! collector exactly once when it reaches a terminal state.
//!
//! # Modules
//!
//! - [`config`] -- Tunables for both agent kinds, with defaults.
//! - [`traveler`] -- [`Traveler`]: start search, random walk, trap death,
//!   deadlock.
//! - [`squatter`] -- [`Squatter`]: spot search, eviction handling, expiry.
//! - [`error`] -- [`AgentError`].
//!
//! [`CellHandle`]: travelers_world::CellHandle
//! [`EventLog`]: travelers_events::EventLog

pub mod config;
pub mod error;
pub mod squatter;
pub mod traveler;

#[cfg(test)]
mod testing;

pub use config::{SquatterConfig, TravelerConfig};
pub use error::AgentError;
pub use squatter::{Squatter, SquatterOutcome};
pub use traveler::{Traveler, TravelerOutcome};
