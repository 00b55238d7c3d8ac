//! Event timestamps.
//!
//! Timestamps are nanoseconds since the Unix epoch, but they are derived
//! from a monotonic [`Instant`] anchored once at simulation start. Wall-clock
//! adjustments during a run therefore never make the log go backwards.

use std::time::Instant;

use chrono::Utc;

/// Monotonic nanosecond clock anchored to wall-clock time.
///
/// The clock is `Copy`; every actor and agent holds its own copy and they all
/// agree because they share the same anchor.
#[derive(Debug, Clone, Copy)]
pub struct EventClock {
    /// Monotonic reference point.
    origin: Instant,
    /// Unix time in nanoseconds at `origin`.
    origin_unix_nanos: u64,
}

impl EventClock {
    /// Anchor a new clock at the current instant.
    pub fn start() -> Self {
        let unix = Utc::now().timestamp_nanos_opt().unwrap_or(0);
        Self {
            origin: Instant::now(),
            origin_unix_nanos: u64::try_from(unix).unwrap_or(0),
        }
    }

    /// Current timestamp in Unix nanoseconds.
    pub fn now_nanos(&self) -> u64 {
        let elapsed = u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.origin_unix_nanos.saturating_add(elapsed)
    }
}

impl Default for EventClock {
    fn default() -> Self {
        Self::start()
    }
}
