//! Deferred save-call buffering.
//!
//! Callers bind a [`Record`] to a [`Sink`] with [`CallQueue::enqueue`] and
//! later run every buffered save, oldest first, with [`CallQueue::process`].

pub mod core;
pub mod queue;
pub mod record;
pub mod shared;
pub mod sink;

pub use crate::core::{Clock, Error, FailurePolicy, QueueConfig, Result};
pub use queue::{CallQueue, DeferredCall, ProcessReport, SaveFailure};
pub use record::{Record, Timestamp};
pub use shared::SharedCallQueue;
pub use sink::{ConsoleSink, JsonExporterSink, Journal, JournalEntry, NullSink, RecordingSink, Sink};
