//! Shared type definitions for the travelers grid simulation.
//!
//! Every crate in the workspace speaks in these types: toroidal grid
//! coordinates, entity identities, log symbols, the small enums that make
//! up the cell reservation protocol, and the event clock.
//!
//! # Modules
//!
//! - [`coord`] -- [`Coordinate`], [`GridDimensions`] and [`Direction`] with
//!   wraparound arithmetic.
//! - [`ids`] -- [`EntityId`] with disjoint ranges for travelers, squatters
//!   and trap pseudo-identities.
//! - [`symbol`] -- [`Symbol`], the single character shown for an event.
//! - [`enums`] -- Occupancy, reservation and status enums.
//! - [`clock`] -- [`EventClock`], monotonic nanosecond timestamps.

pub mod clock;
pub mod coord;
pub mod enums;
pub mod ids;
pub mod symbol;

pub use clock::EventClock;
pub use coord::{Coordinate, Direction, GridDimensions};
pub use enums::{CellStatus, OccupantKind, ReserveOutcome};
pub use ids::EntityId;
pub use symbol::Symbol;
