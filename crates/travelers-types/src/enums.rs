//! Enumeration types for the cell reservation protocol.

/// Who currently holds a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OccupantKind {
    /// Nobody; the cell is free.
    #[default]
    None,
    /// A traveler, or whoever is currently dying on a triggered trap.
    Traveler,
    /// A squatter, evictable by travelers.
    Squatter,
}

/// Reply to a reservation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReserveOutcome {
    /// The requester now holds the cell.
    Granted,
    /// The cell was already held; nothing changed for the requester.
    Denied,
    /// The cell is a trap: the requester holds it and is dead.
    TrapTriggered,
}

/// Read-only snapshot of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStatus {
    /// Free and harmless.
    Free,
    /// Held by a traveler.
    OccupiedTraveler,
    /// Held by a squatter.
    OccupiedSquatter,
    /// A trap, regardless of transient occupancy.
    Trap,
}
