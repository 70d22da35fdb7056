//! Destinations a buffered record can be saved to.
//!
//! Every destination implements [`Sink`]; the queue stores `Arc<dyn Sink>`
//! handles and calls `save` without knowing the concrete variant.

use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::{Error, Result};
use crate::record::Record;

mod json;

pub use json::JsonExporterSink;

/// Sink trait for record destinations.
pub trait Sink: Send + Sync {
    /// Save one record. Called exactly once per queued entry.
    fn save(&self, record: &Record) -> Result<()>;

    /// Flush any buffered output.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Sink that drops all records.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn save(&self, _record: &Record) -> Result<()> {
        Ok(())
    }
}

/// Writes one human-readable line per record:
/// `[<instance>] [<timestamp>] [<author>] <text>`.
///
/// The instance number only tells apart lines from different sinks that
/// share one output stream.
pub struct ConsoleSink<W: Write + Send = Stdout> {
    instance_number: i64,
    out: Mutex<W>,
}

impl ConsoleSink<Stdout> {
    pub fn new(instance_number: i64) -> Self {
        Self::with_writer(instance_number, io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn with_writer(instance_number: i64, out: W) -> Self {
        Self {
            instance_number,
            out: Mutex::new(out),
        }
    }

    pub fn instance_number(&self) -> i64 {
        self.instance_number
    }

    /// Locks and returns the underlying writer.
    pub fn lock_writer(&self) -> Result<MutexGuard<'_, W>> {
        self.out
            .lock()
            .map_err(|_| Error::Poisoned("console sink writer"))
    }
}

impl<W: Write + Send> Sink for ConsoleSink<W> {
    fn save(&self, record: &Record) -> Result<()> {
        let mut out = self.lock_writer()?;
        writeln!(
            out,
            "[{}] [{}] [{}] {}",
            self.instance_number,
            record.timestamp(),
            record.author(),
            record.text()
        )?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.lock_writer()?.flush()?;
        Ok(())
    }
}

/// One save observed by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub label: String,
    pub record: Record,
}

/// Save log shared by any number of [`RecordingSink`]s, in call order.
///
/// A push cannot leave the log half-written, so a lock poisoned by a thread
/// that panicked while holding it is recovered rather than reported.
#[derive(Debug, Default, Clone)]
pub struct Journal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<JournalEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, entry: JournalEntry) {
        self.lock().push(entry);
    }
}

/// Sink that appends every saved record, tagged with its label, to a [`Journal`].
#[derive(Debug, Clone)]
pub struct RecordingSink {
    label: String,
    journal: Journal,
}

impl RecordingSink {
    pub fn new(label: impl Into<String>, journal: Journal) -> Self {
        Self {
            label: label.into(),
            journal,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Sink for RecordingSink {
    fn save(&self, record: &Record) -> Result<()> {
        self.journal.push(JournalEntry {
            label: self.label.clone(),
            record: record.clone(),
        });
        Ok(())
    }
}
