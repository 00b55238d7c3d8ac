//! Error types for the `travelers-events` crate.

/// Failures of the collection pipeline.
///
/// A full queue is not an error: producers wait for space. These variants
/// cover the collector being gone or its sink refusing writes.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// The collector stopped before the batch could be queued.
    #[error("event collector is closed; {dropped} event(s) could not be delivered")]
    Closed {
        /// Size of the batch that was refused.
        dropped: usize,
    },

    /// The sink failed to write or flush.
    #[error("event sink I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The collector task panicked or was cancelled.
    #[error("event collector task failed: {message}")]
    Task {
        /// Description of the join failure.
        message: String,
    },
}
