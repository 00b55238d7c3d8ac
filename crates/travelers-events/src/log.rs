//! Per-agent event history.
//!
//! An agent owns exactly one [`EventLog`] for its whole life. Events are
//! appended in creation order and the log is released to the collector in a
//! single hand-off by [`EventLog::flush`], which consumes it so that a
//! history cannot be flushed twice.

use travelers_types::{Coordinate, EntityId, EventClock, Symbol};

use crate::collector::EventSender;
use crate::error::CollectorError;
use crate::event::Event;

/// Ordered, append-only history of one entity.
#[derive(Debug)]
pub struct EventLog {
    entity: EntityId,
    clock: EventClock,
    events: Vec<Event>,
}

impl EventLog {
    /// Start an empty history for `entity`.
    pub const fn new(entity: EntityId, clock: EventClock) -> Self {
        Self {
            entity,
            clock,
            events: Vec::new(),
        }
    }

    /// Append an event at `coord`.
    ///
    /// Timestamps inside one log are strictly increasing: when the clock has
    /// not moved since the previous record, the new event is placed one
    /// nanosecond after it.
    pub fn record(&mut self, coord: Coordinate, symbol: Symbol) {
        let now = self.clock.now_nanos();
        let timestamp_nanos = match self.events.last() {
            Some(prev) if now <= prev.timestamp_nanos => prev.timestamp_nanos.saturating_add(1),
            _ => now,
        };
        self.events.push(Event {
            timestamp_nanos,
            entity: self.entity,
            coord,
            symbol,
        });
    }

    /// Events recorded so far, oldest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Hand the whole history to the collector. Returns the number of events
    /// delivered. An empty history is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Closed`] if the collector has stopped.
    pub async fn flush(self, sender: &EventSender) -> Result<usize, CollectorError> {
        let count = self.events.len();
        sender.submit(self.events).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_creation_order_with_strictly_increasing_timestamps() {
        let mut log = EventLog::new(EntityId::traveler(1), EventClock::start());
        let here = Coordinate::new(1, 1);
        log.record(here, Symbol::traveler(1));
        log.record(here, Symbol::traveler(1).to_death());
        log.record(Coordinate::new(2, 1), Symbol::TRAP);

        let events = log.events();
        assert_eq!(events.len(), 3);
        assert!(events.windows(2).all(|w| match w {
            [a, b] => a.timestamp_nanos < b.timestamp_nanos,
            _ => true,
        }));
        assert_eq!(events.first().map(|e| e.symbol.as_char()), Some('A'));
        assert_eq!(events.get(1).map(|e| e.symbol.as_char()), Some('a'));
        assert!(events.iter().all(|e| e.entity == EntityId::traveler(1)));
    }

    #[test]
    fn new_log_is_empty() {
        let log = EventLog::new(EntityId::squatter(0), EventClock::start());
        assert!(log.events().is_empty());
    }
}
