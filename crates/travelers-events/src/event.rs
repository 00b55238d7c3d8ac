//! Line formats of the output stream.

use travelers_types::{Coordinate, EntityId, GridDimensions, Symbol};

/// One immutable entry of the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Unix nanoseconds at which the event was recorded.
    pub timestamp_nanos: u64,
    /// Who the event belongs to.
    pub entity: EntityId,
    /// Where it happened.
    pub coord: Coordinate,
    /// What happened.
    pub symbol: Symbol,
}

impl core::fmt::Display for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.timestamp_nanos, self.entity, self.coord.x, self.coord.y, self.symbol
        )
    }
}

/// The first line of the stream: `-1 <totalEntities> <width> <height>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    /// Travelers plus the squatter cap plus traps.
    pub total_entities: u32,
    /// Board size.
    pub dimensions: GridDimensions,
}

impl core::fmt::Display for StreamHeader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "-1 {} {} {}",
            self.total_entities, self.dimensions.width, self.dimensions.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_line_format() {
        let event = Event {
            timestamp_nanos: 1_700_000_000_000_000_123,
            entity: EntityId::traveler(2),
            coord: Coordinate::new(3, 4),
            symbol: Symbol::traveler(2),
        };
        assert_eq!(event.to_string(), "1700000000000000123 2 3 4 B");
    }

    #[test]
    fn header_line_format() {
        let header = StreamHeader {
            total_entities: 12,
            dimensions: GridDimensions::new(5, 6),
        };
        assert_eq!(header.to_string(), "-1 12 5 6");
    }
}
