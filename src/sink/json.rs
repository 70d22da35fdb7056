use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use super::Sink;
use crate::core::{Error, Result};
use crate::record::Record;

#[derive(Serialize)]
struct JsonLine<'a> {
    date: String,
    text: &'a str,
    author: &'a str,
}

/// Exports each record as one JSON object per line:
/// `{"date":"<timestamp>","text":"<text>","author":"<author>"}`.
pub struct JsonExporterSink<W: Write + Send = Stdout> {
    out: Mutex<W>,
}

impl JsonExporterSink<Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for JsonExporterSink<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonExporterSink<BufWriter<File>> {
    /// Export to a file, truncating it if it exists.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path).map_err(Error::Io)?;
        Ok(Self::with_writer(BufWriter::new(file)))
    }
}

impl<W: Write + Send> JsonExporterSink<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Locks and returns the underlying writer.
    pub fn lock_writer(&self) -> Result<MutexGuard<'_, W>> {
        self.out
            .lock()
            .map_err(|_| Error::Poisoned("json exporter writer"))
    }
}

impl<W: Write + Send> Sink for JsonExporterSink<W> {
    fn save(&self, record: &Record) -> Result<()> {
        let line = JsonLine {
            date: record.timestamp().to_string(),
            text: record.text(),
            author: record.author(),
        };
        let mut out = self.lock_writer()?;
        serde_json::to_writer(&mut *out, &line)?;
        out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.lock_writer()?.flush()?;
        Ok(())
    }
}
