//! Event records and the single collection point for the travelers grid
//! simulation.
//!
//! Every observable thing that happens in a run becomes an [`Event`]: one
//! line of `<timestampNanos> <entityId> <x> <y> <symbol>`. Agents buffer
//! their events in a private [`EventLog`] and hand the whole history to the
//! [`Collector`] once, when they terminate. Trap cells submit their birth
//! events one at a time. The collector is the only writer of the output
//! stream.
//!
//! # Modules
//!
//! - [`event`] -- [`Event`] and [`StreamHeader`] line formats.
//! - [`log`] -- [`EventLog`], an agent's ordered private history.
//! - [`collector`] -- [`Collector`] task and its [`EventSender`] handle.
//! - [`sink`] -- [`EventSink`] trait and the [`TextSink`] writer adapter.
//! - [`error`] -- [`CollectorError`].

pub mod collector;
pub mod error;
pub mod event;
pub mod log;
pub mod sink;

pub use collector::{Collector, CollectorReport, CollectorStats, EventSender};
pub use error::CollectorError;
pub use event::{Event, StreamHeader};
pub use log::EventLog;
pub use sink::{EventSink, TextSink};
