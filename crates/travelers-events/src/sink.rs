//! Output adapters for the collector.
//!
//! The collector does not care where lines go. The binary writes to stdout;
//! tests write into a `Vec<u8>` and read it back.

use std::io::Write;

use crate::event::{Event, StreamHeader};

/// Destination of the output stream.
///
/// Implementations must persist lines in the order they are given and must
/// not reorder them.
pub trait EventSink {
    /// Write the stream header. Called once, before any event.
    fn write_header(&mut self, header: &StreamHeader) -> std::io::Result<()>;

    /// Write one event line.
    fn write_event(&mut self, event: &Event) -> std::io::Result<()>;

    /// Flush buffered output.
    fn flush(&mut self) -> std::io::Result<()>;
}

/// Newline-delimited text sink over any [`Write`].
#[derive(Debug, Default)]
pub struct TextSink<W> {
    inner: W,
}

impl<W: Write> TextSink<W> {
    /// Wrap a writer.
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Borrow the underlying writer.
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> EventSink for TextSink<W> {
    fn write_header(&mut self, header: &StreamHeader) -> std::io::Result<()> {
        writeln!(self.inner, "{header}")
    }

    fn write_event(&mut self, event: &Event) -> std::io::Result<()> {
        writeln!(self.inner, "{event}")
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use travelers_types::{Coordinate, EntityId, GridDimensions, Symbol};

    use super::*;

    #[test]
    fn writes_one_line_per_record() {
        let mut sink = TextSink::new(Vec::new());
        let header = StreamHeader {
            total_entities: 3,
            dimensions: GridDimensions::new(2, 2),
        };
        let event = Event {
            timestamp_nanos: 10,
            entity: EntityId::squatter(1),
            coord: Coordinate::new(1, 0),
            symbol: Symbol::VACATED,
        };
        assert!(sink.write_header(&header).is_ok());
        assert!(sink.write_event(&event).is_ok());
        assert!(sink.flush().is_ok());

        let text = String::from_utf8(sink.into_inner()).unwrap_or_default();
        assert_eq!(text, "-1 3 2 2\n10 1001 1 0 .\n");
    }
}
