//! Error types for the `travelers-world` crate.
//!
//! None of these are domain outcomes. A reservation that is denied or a
//! trap that fires is a normal reply; these variants describe a board that
//! cannot be built or a cell that can no longer be reached.

use travelers_types::{Coordinate, GridDimensions};

/// Errors that can occur while building or addressing the board.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The board has a zero-length side.
    #[error("invalid grid dimensions {0}")]
    InvalidDimensions(GridDimensions),

    /// More traps were requested than the board has cells.
    #[error("cannot place {requested} traps on a board of {cells} cells")]
    TooManyTraps {
        /// Traps requested.
        requested: u64,
        /// Cells available.
        cells: u64,
    },

    /// A coordinate lies outside the board.
    #[error("coordinate {0} is outside the board")]
    OutOfBounds(Coordinate),

    /// The cell actor stopped before it could answer.
    #[error("cell {0} is no longer accepting requests")]
    MailboxClosed(Coordinate),
}
