//! Toroidal grid addressing.
//!
//! The board has no edges: stepping off one side re-enters on the opposite
//! side. All wraparound arithmetic lives here so that no other crate has to
//! reason about modular offsets.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A cell address on the board.
///
/// Coordinates produced by [`GridDimensions`] are always in range; a
/// coordinate built by hand is only meaningful for the grid it was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Column, in `[0, width)`.
    pub x: u32,
    /// Row, in `[0, height)`.
    pub y: u32,
}

impl Coordinate {
    /// Create a coordinate from its column and row.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four orthogonal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `x - 1`.
    West,
    /// `x + 1`.
    East,
    /// `y - 1`.
    North,
    /// `y + 1`.
    South,
}

impl Direction {
    /// All directions in the fixed probing order used by squatters.
    pub const ALL: [Self; 4] = [Self::West, Self::East, Self::North, Self::South];

    /// The `(dx, dy)` offset of this direction.
    pub const fn offset(self) -> (i8, i8) {
        match self {
            Self::West => (-1, 0),
            Self::East => (1, 0),
            Self::North => (0, -1),
            Self::South => (0, 1),
        }
    }

    /// Pick a direction uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.random_range(0..4_u8) {
            0 => Self::West,
            1 => Self::East,
            2 => Self::North,
            _ => Self::South,
        }
    }
}

/// Width and height of the toroidal board.
///
/// Both sides must be at least 1; the simulation config rejects anything
/// smaller before a grid is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl GridDimensions {
    /// Create grid dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether both sides are non-zero.
    pub const fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Total number of cells.
    pub const fn cell_count(&self) -> u64 {
        (self.width as u64).saturating_mul(self.height as u64)
    }

    /// Whether the coordinate lies inside the board.
    pub const fn contains(&self, coord: Coordinate) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Row-major index of a coordinate, or `None` when it is off the board.
    pub fn index_of(&self, coord: Coordinate) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let row = u64::from(coord.y).checked_mul(u64::from(self.width))?;
        usize::try_from(row.checked_add(u64::from(coord.x))?).ok()
    }

    /// Inverse of [`index_of`](Self::index_of).
    pub fn coordinate_at(&self, index: usize) -> Option<Coordinate> {
        let index = u64::try_from(index).ok()?;
        if !self.is_valid() || index >= self.cell_count() {
            return None;
        }
        let width = u64::from(self.width);
        let x = u32::try_from(index.checked_rem(width)?).ok()?;
        let y = u32::try_from(index.checked_div(width)?).ok()?;
        Some(Coordinate::new(x, y))
    }

    /// Every coordinate in row-major order.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + use<> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Coordinate::new(x, y)))
    }

    /// The neighbour of `coord` one step in `direction`, wrapping at the edges.
    pub fn step(&self, coord: Coordinate, direction: Direction) -> Coordinate {
        let (dx, dy) = direction.offset();
        Coordinate::new(wrap(coord.x, dx, self.width), wrap(coord.y, dy, self.height))
    }

    /// A uniformly random cell.
    ///
    /// The dimensions must be valid; an empty board has no cell to return.
    pub fn random_coordinate<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate {
        Coordinate::new(
            rng.random_range(0..self.width.max(1)),
            rng.random_range(0..self.height.max(1)),
        )
    }
}

impl core::fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn wrap(value: u32, delta: i8, len: u32) -> u32 {
    let len = i64::from(len.max(1));
    let shifted = i64::from(value).saturating_add(i64::from(delta));
    u32::try_from(shifted.rem_euclid(len)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn step_wraps_on_every_edge() {
        let dims = GridDimensions::new(5, 4);
        let origin = Coordinate::new(0, 0);
        assert_eq!(dims.step(origin, Direction::West), Coordinate::new(4, 0));
        assert_eq!(dims.step(origin, Direction::North), Coordinate::new(0, 3));

        let corner = Coordinate::new(4, 3);
        assert_eq!(dims.step(corner, Direction::East), Coordinate::new(0, 3));
        assert_eq!(dims.step(corner, Direction::South), Coordinate::new(4, 0));
    }

    #[test]
    fn step_on_single_cell_board_stays_put() {
        let dims = GridDimensions::new(1, 1);
        let only = Coordinate::new(0, 0);
        for direction in Direction::ALL {
            assert_eq!(dims.step(only, direction), only);
        }
    }

    #[test]
    fn index_and_coordinate_are_inverse() {
        let dims = GridDimensions::new(3, 2);
        for (i, coord) in dims.coordinates().enumerate() {
            assert_eq!(dims.index_of(coord), Some(i));
            assert_eq!(dims.coordinate_at(i), Some(coord));
        }
        assert_eq!(dims.coordinates().count(), 6);
        assert_eq!(dims.index_of(Coordinate::new(3, 0)), None);
        assert_eq!(dims.coordinate_at(6), None);
    }

    #[test]
    fn random_coordinate_stays_on_board() {
        let dims = GridDimensions::new(7, 3);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            assert!(dims.contains(dims.random_coordinate(&mut rng)));
        }
    }

    #[test]
    fn zero_sized_board_is_invalid() {
        assert!(!GridDimensions::new(0, 5).is_valid());
        assert!(!GridDimensions::new(5, 0).is_valid());
        assert!(GridDimensions::new(1, 1).is_valid());
    }
}
