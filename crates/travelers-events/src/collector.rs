//! The event collector: the one serialization point of the output stream.
//!
//! The collector runs as its own task behind a bounded queue of event
//! batches. Each batch is one producer's hand-off: a whole agent history, or
//! a single trap birth. Batches are written in arrival order and a batch is
//! never interleaved with another; nothing is promised about the order
//! *between* producers.
//!
//! A full queue makes [`EventSender::submit`] wait. Events are never dropped
//! for lack of space.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::CollectorError;
use crate::event::{Event, StreamHeader};
use crate::sink::EventSink;

/// Cloneable producer handle for the collector queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Vec<Event>>,
}

impl EventSender {
    /// Queue a batch of events, waiting while the queue is full.
    ///
    /// Empty batches are accepted and discarded without touching the queue.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Closed`] if the collector has stopped.
    pub async fn submit(&self, batch: Vec<Event>) -> Result<(), CollectorError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.tx
            .send(batch)
            .await
            .map_err(|refused| CollectorError::Closed {
                dropped: refused.0.len(),
            })
    }

    /// Queue a single event.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Closed`] if the collector has stopped.
    pub async fn emit(&self, event: Event) -> Result<(), CollectorError> {
        self.submit(vec![event]).await
    }
}

/// Counters kept by the collector while draining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorStats {
    /// Hand-offs received.
    pub batches: u64,
    /// Event lines written, excluding the header.
    pub events: u64,
}

/// What the collector hands back once the stream is complete.
#[derive(Debug)]
pub struct CollectorReport<S> {
    /// The sink, with every line written and flushed.
    pub sink: S,
    /// Totals for the run.
    pub stats: CollectorStats,
}

/// Handle to a running collector task.
#[derive(Debug)]
pub struct Collector<S> {
    handle: JoinHandle<Result<CollectorReport<S>, CollectorError>>,
}

impl<S> Collector<S>
where
    S: EventSink + Send + 'static,
{
    /// Start the collector on the current tokio runtime.
    ///
    /// The header is written before the first batch is read, so it always
    /// precedes every event regardless of how early producers start.
    /// `capacity` is the number of batches the queue holds before producers
    /// wait; zero is treated as one.
    pub fn spawn(sink: S, header: StreamHeader, capacity: usize) -> (Self, EventSender) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(drain(sink, header, rx));
        (Self { handle }, EventSender { tx })
    }

    /// Wait for the stream to complete and take back the sink.
    ///
    /// The collector finishes once every [`EventSender`] has been dropped
    /// and the queue is empty.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Io`] if the sink failed, or
    /// [`CollectorError::Task`] if the task did not run to completion.
    pub async fn finish(self) -> Result<CollectorReport<S>, CollectorError> {
        self.handle.await.map_err(|e| CollectorError::Task {
            message: e.to_string(),
        })?
    }
}

/// Sink writes are synchronous and run on the runtime thread. Sinks are
/// buffered (`BufWriter` over stdout in the binary, `Vec<u8>` in tests), so a
/// write is a memory copy until the buffer fills. The drain stays an ordinary
/// task rather than a `spawn_blocking` job because a pending blocking job
/// stops a paused test clock from auto-advancing.
async fn drain<S: EventSink>(
    mut sink: S,
    header: StreamHeader,
    mut rx: mpsc::Receiver<Vec<Event>>,
) -> Result<CollectorReport<S>, CollectorError> {
    sink.write_header(&header)?;
    let mut stats = CollectorStats::default();

    while let Some(batch) = rx.recv().await {
        stats.batches = stats.batches.saturating_add(1);
        debug!(events = batch.len(), "collector received batch");
        for event in &batch {
            sink.write_event(event)?;
            stats.events = stats.events.saturating_add(1);
        }
    }

    sink.flush()?;
    info!(
        batches = stats.batches,
        events = stats.events,
        "event collector drained"
    );
    Ok(CollectorReport { sink, stats })
}
