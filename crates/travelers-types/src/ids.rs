//! Entity identifiers as they appear in the event stream.
//!
//! The log format carries a bare integer per line, so identities are a
//! single numeric space split into disjoint ranges:
//!
//! | Kind     | Range                      |
//! |----------|----------------------------|
//! | Traveler | `1..1000`                  |
//! | Squatter | `1000..2000`               |
//! | Trap     | `2000 + 3x + 100y`         |
//!
//! The trap pseudo-identity depends only on the cell's coordinates, so it is
//! stable for the whole run and reproducible across runs.

use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;

/// First squatter id; squatter `i` is `SQUATTER_ID_BASE + i`.
pub const SQUATTER_ID_BASE: u32 = 1000;

/// Base of the trap pseudo-identity formula.
pub const TRAP_ID_BASE: u32 = 2000;

/// Numeric identity of anything that writes to the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Identity of the traveler with the given 1-based number.
    pub const fn traveler(number: u32) -> Self {
        Self(number)
    }

    /// Identity of the squatter with the given 0-based spawn index.
    pub const fn squatter(index: u32) -> Self {
        Self(SQUATTER_ID_BASE.saturating_add(index))
    }

    /// Pseudo-identity of the trap at `coord`.
    pub const fn trap(coord: Coordinate) -> Self {
        Self(
            TRAP_ID_BASE
                .saturating_add(coord.x.saturating_mul(3))
                .saturating_add(coord.y.saturating_mul(100)),
        )
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_do_not_overlap() {
        assert_eq!(EntityId::traveler(5), EntityId(5));
        assert_eq!(EntityId::squatter(0), EntityId(1000));
        assert_eq!(EntityId::squatter(1), EntityId(1001));
        assert!(EntityId::trap(Coordinate::new(0, 0)).0 >= TRAP_ID_BASE);
    }

    #[test]
    fn trap_identity_follows_coordinates() {
        assert_eq!(EntityId::trap(Coordinate::new(2, 3)), EntityId(2306));
        assert_eq!(
            EntityId::trap(Coordinate::new(4, 1)),
            EntityId::trap(Coordinate::new(4, 1))
        );
        assert_ne!(
            EntityId::trap(Coordinate::new(1, 0)),
            EntityId::trap(Coordinate::new(0, 1))
        );
    }
}
