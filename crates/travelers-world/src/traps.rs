//! Trap placement.
//!
//! Traps are chosen once, before any cell actor starts, and never change
//! afterwards. The registry is a plain value handed to the grid at
//! construction; nothing reads trap placement from shared global state.

use std::collections::BTreeSet;

use rand::Rng;
use travelers_types::{Coordinate, GridDimensions};

use crate::error::WorldError;

/// The set of trap coordinates for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrapRegistry {
    traps: BTreeSet<Coordinate>,
}

impl TrapRegistry {
    /// Draw `count` unique trap coordinates uniformly over the board.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] for an empty board and
    /// [`WorldError::TooManyTraps`] if `count` exceeds the number of cells.
    pub fn generate<R: Rng + ?Sized>(
        dimensions: GridDimensions,
        count: u32,
        rng: &mut R,
    ) -> Result<Self, WorldError> {
        if !dimensions.is_valid() {
            return Err(WorldError::InvalidDimensions(dimensions));
        }
        let cells = dimensions.cell_count();
        if u64::from(count) > cells {
            return Err(WorldError::TooManyTraps {
                requested: u64::from(count),
                cells,
            });
        }

        let wanted = usize::try_from(count).unwrap_or(usize::MAX);
        let mut traps = BTreeSet::new();
        // Rejection sampling: a repeated draw simply does not grow the set.
        while traps.len() < wanted {
            traps.insert(dimensions.random_coordinate(rng));
        }
        Ok(Self { traps })
    }

    /// Build a registry from explicit coordinates. Duplicates collapse.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if any coordinate is off the board.
    pub fn from_coordinates(
        dimensions: GridDimensions,
        coords: impl IntoIterator<Item = Coordinate>,
    ) -> Result<Self, WorldError> {
        let mut traps = BTreeSet::new();
        for coord in coords {
            if !dimensions.contains(coord) {
                return Err(WorldError::OutOfBounds(coord));
            }
            traps.insert(coord);
        }
        Ok(Self { traps })
    }

    /// Whether `coord` is a trap.
    pub fn is_trap(&self, coord: Coordinate) -> bool {
        self.traps.contains(&coord)
    }

    /// Number of traps.
    pub fn len(&self) -> usize {
        self.traps.len()
    }

    /// Whether there are no traps.
    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }

    /// Trap coordinates in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.traps.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn generates_exact_number_of_unique_traps() {
        let dims = GridDimensions::new(5, 5);
        let mut rng = StdRng::seed_from_u64(7);
        let traps = TrapRegistry::generate(dims, 5, &mut rng).unwrap();
        assert_eq!(traps.len(), 5);
        assert!(traps.iter().all(|c| dims.contains(c)));
    }

    #[test]
    fn can_fill_the_whole_board() {
        let dims = GridDimensions::new(3, 2);
        let mut rng = StdRng::seed_from_u64(1);
        let traps = TrapRegistry::generate(dims, 6, &mut rng).unwrap();
        assert!(dims.coordinates().all(|c| traps.is_trap(c)));
    }

    #[test]
    fn zero_traps_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let traps = TrapRegistry::generate(GridDimensions::new(4, 4), 0, &mut rng).unwrap();
        assert!(traps.is_empty());
    }

    #[test]
    fn rejects_more_traps_than_cells() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = TrapRegistry::generate(GridDimensions::new(2, 2), 5, &mut rng);
        assert!(matches!(
            result,
            Err(WorldError::TooManyTraps { requested: 5, cells: 4 })
        ));
    }

    #[test]
    fn same_seed_same_traps() {
        let dims = GridDimensions::new(10, 10);
        let a = TrapRegistry::generate(dims, 8, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = TrapRegistry::generate(dims, 8, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn explicit_coordinates_must_be_on_board() {
        let dims = GridDimensions::new(2, 2);
        assert!(TrapRegistry::from_coordinates(dims, [Coordinate::new(1, 1)]).is_ok());
        assert!(matches!(
            TrapRegistry::from_coordinates(dims, [Coordinate::new(2, 0)]),
            Err(WorldError::OutOfBounds(_))
        ));
    }
}
