//! Shared fixtures for agent tests: a live board wired to a collector that
//! writes into memory.

use std::sync::Arc;

use travelers_events::{Collector, EventSender, StreamHeader, TextSink};
use travelers_types::{Coordinate, EventClock, GridDimensions};
use travelers_world::{Grid, TrapRegistry};

pub(crate) struct Board {
    pub(crate) grid: Arc<Grid>,
    pub(crate) events: EventSender,
    pub(crate) clock: EventClock,
    collector: Collector<TextSink<Vec<u8>>>,
}

impl Board {
    pub(crate) fn new(dimensions: GridDimensions, traps: &[Coordinate]) -> Self {
        let header = StreamHeader {
            total_entities: 0,
            dimensions,
        };
        let (collector, events) = Collector::spawn(TextSink::new(Vec::new()), header, 16);
        let clock = EventClock::start();
        let traps = TrapRegistry::from_coordinates(dimensions, traps.iter().copied()).unwrap();
        let grid = Arc::new(Grid::spawn(dimensions, &traps, &events, clock, 1).unwrap());
        Self {
            grid,
            events,
            clock,
            collector,
        }
    }

    /// Tear the board down and return everything written after the header.
    pub(crate) async fn finish(self) -> String {
        drop(self.grid);
        drop(self.events);
        let report = self.collector.finish().await.unwrap();
        String::from_utf8(report.sink.into_inner()).unwrap()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line {
    pub(crate) timestamp: u64,
    pub(crate) entity: u32,
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) symbol: char,
}

impl Line {
    pub(crate) const fn coord(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}

/// Parse every event line, skipping the header.
pub(crate) fn parse_lines(text: &str) -> Vec<Line> {
    text.lines()
        .filter(|line| !line.starts_with("-1 "))
        .map(|line| {
            let fields: Vec<&str> = line.split(' ').collect();
            assert_eq!(fields.len(), 5, "malformed line {line:?}");
            Line {
                timestamp: fields[0].parse().unwrap(),
                entity: fields[1].parse().unwrap(),
                x: fields[2].parse().unwrap(),
                y: fields[3].parse().unwrap(),
                symbol: fields[4].chars().next().unwrap(),
            }
        })
        .collect()
}
