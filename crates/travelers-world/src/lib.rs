//! The board of the travelers simulation: traps, cells and the grid that
//! owns them.
//!
//! Each grid cell is an independent actor. Its occupancy lives only inside
//! its own message loop, and every other task talks to it through a
//! [`CellHandle`]. Requests to one cell are processed strictly one at a
//! time, which is what guarantees at most one occupant per cell without any
//! lock.
//!
//! # Modules
//!
//! - [`traps`] -- [`TrapRegistry`], the fixed set of lethal coordinates.
//! - [`cell`] -- [`CellState`] transitions, the cell actor loop,
//!   [`CellHandle`] and the squatter eviction channel.
//! - [`grid`] -- [`Grid`], one running cell actor per coordinate.
//! - [`error`] -- [`WorldError`].

pub mod cell;
pub mod error;
pub mod grid;
pub mod traps;

pub use cell::{
    CellHandle, CellState, EvictionInbox, EvictionNotifier, Kick, eviction_channel,
};
pub use error::WorldError;
pub use grid::Grid;
pub use traps::TrapRegistry;
