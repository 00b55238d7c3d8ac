//! The board: one running cell actor per coordinate.

use rand::Rng;
use tracing::info;
use travelers_events::EventSender;
use travelers_types::{CellStatus, Coordinate, Direction, EventClock, GridDimensions};

use crate::cell::{CellHandle, CellState};
use crate::error::WorldError;
use crate::traps::TrapRegistry;

/// Handles to every cell of a toroidal board.
///
/// The grid itself holds no occupancy state; it only routes a coordinate to
/// the actor that owns it. Dropping the grid (and every handle cloned out of
/// it) lets the cell actors stop.
#[derive(Debug)]
pub struct Grid {
    dimensions: GridDimensions,
    cells: Vec<CellHandle>,
}

impl Grid {
    /// Start a cell actor for every coordinate, in row-major order.
    ///
    /// Trap cells announce themselves on `events` as they start.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] for an empty board.
    pub fn spawn(
        dimensions: GridDimensions,
        traps: &TrapRegistry,
        events: &EventSender,
        clock: EventClock,
        mailbox_capacity: usize,
    ) -> Result<Self, WorldError> {
        if !dimensions.is_valid() {
            return Err(WorldError::InvalidDimensions(dimensions));
        }

        let cells: Vec<CellHandle> = dimensions
            .coordinates()
            .map(|coord| {
                let state = CellState::new(coord, traps.is_trap(coord));
                CellHandle::spawn(state, events.clone(), clock, mailbox_capacity)
            })
            .collect();

        info!(
            dimensions = %dimensions,
            cells = cells.len(),
            traps = traps.len(),
            "grid spawned"
        );
        Ok(Self {
            dimensions,
            cells,
        })
    }

    /// Board size.
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Handle to the cell at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `coord` is off the board.
    pub fn cell(&self, coord: Coordinate) -> Result<&CellHandle, WorldError> {
        self.dimensions
            .index_of(coord)
            .and_then(|index| self.cells.get(index))
            .ok_or(WorldError::OutOfBounds(coord))
    }

    /// The neighbour of `coord` in `direction`, wrapping at the edges.
    pub fn neighbor(&self, coord: Coordinate, direction: Direction) -> Coordinate {
        self.dimensions.step(coord, direction)
    }

    /// A uniformly random cell coordinate.
    pub fn random_coordinate<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate {
        self.dimensions.random_coordinate(rng)
    }

    /// Status of every cell in row-major order.
    ///
    /// Each cell answers independently, so the result is not an atomic
    /// picture of the board while agents are still moving.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MailboxClosed`] if any actor has stopped.
    pub async fn snapshot(&self) -> Result<Vec<(Coordinate, CellStatus)>, WorldError> {
        let mut statuses = Vec::with_capacity(self.cells.len());
        for cell in &self.cells {
            statuses.push((cell.coord(), cell.status().await?));
        }
        Ok(statuses)
    }
}
