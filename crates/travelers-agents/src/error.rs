//! Error types for the `travelers-agents` crate.
//!
//! Dying on a trap, deadlocking or expiring are outcomes, not errors. An
//! [`AgentError`] means the agent lost contact with the board or with the
//! collector, which only happens when a run is torn down underneath it.

use travelers_events::CollectorError;
use travelers_world::WorldError;

/// Errors that end an agent abnormally.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A cell could not be reached.
    #[error("board error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The history could not be handed to the collector.
    #[error("collector error: {source}")]
    Collector {
        /// The underlying collector error.
        #[from]
        source: CollectorError,
    },
}
