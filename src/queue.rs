//! FIFO buffer of deferred save calls.
//!
//! # Design
//!
//! - `enqueue` captures the record by value and a shared handle to its sink
//! - `process` pops from the head and calls `save` until the queue is empty
//! - Each entry is removed before its `save` runs, so it executes at most once
//! - The queue never reads a clock and never flushes sinks

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::core::{Error, FailurePolicy, QueueConfig, Result};
use crate::record::{Record, Timestamp};
use crate::sink::Sink;

/// One pending save: a sink handle and the record it will receive.
#[derive(Clone)]
pub struct DeferredCall {
    sink: Arc<dyn Sink>,
    record: Record,
}

impl DeferredCall {
    pub fn new(sink: Arc<dyn Sink>, record: Record) -> Self {
        Self { sink, record }
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Run the call, consuming it.
    pub fn execute(self) -> std::result::Result<(), (Record, Error)> {
        match self.sink.save(&self.record) {
            Ok(()) => Ok(()),
            Err(err) => Err((self.record, err)),
        }
    }
}

impl fmt::Debug for DeferredCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredCall")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

/// A save that returned an error while draining.
#[derive(Debug)]
pub struct SaveFailure {
    /// 0-based position of the entry within the drain that failed.
    pub position: usize,
    pub record: Record,
    pub error: Error,
}

/// Outcome of one `process` call.
#[derive(Debug, Default)]
pub struct ProcessReport {
    /// Number of entries whose `save` was invoked, failed ones included.
    pub executed: usize,
    pub failures: Vec<SaveFailure>,
}

impl ProcessReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct CallQueue {
    entries: VecDeque<DeferredCall>,
    config: QueueConfig,
}

impl CallQueue {
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.initial_capacity),
            config,
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Buffer a save of `(timestamp, text, author)` to `sink`. Does not call `save`.
    pub fn enqueue(
        &mut self,
        sink: &Arc<dyn Sink>,
        timestamp: Timestamp,
        text: impl Into<String>,
        author: impl Into<String>,
    ) {
        self.enqueue_record(sink, Record::new(timestamp, text, author));
    }

    pub fn enqueue_record(&mut self, sink: &Arc<dyn Sink>, record: Record) {
        self.push(DeferredCall::new(Arc::clone(sink), record));
    }

    pub(crate) fn push(&mut self, call: DeferredCall) {
        debug!(
            "enqueue: author={} ts={} depth={}",
            call.record.author(),
            call.record.timestamp(),
            self.entries.len() + 1
        );
        self.entries.push_back(call);
    }

    pub(crate) fn take_entries(&mut self) -> VecDeque<DeferredCall> {
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn replace_entries(&mut self, entries: VecDeque<DeferredCall>) {
        self.entries = entries;
    }

    /// Drain the queue in enqueue order, calling each entry's `save` once.
    ///
    /// Under [`FailurePolicy::Continue`] the queue is always empty on return
    /// and failures are listed in the report. Under [`FailurePolicy::Abort`]
    /// the first failure is returned as [`Error::Aborted`]; the failed entry
    /// is consumed and the rest stay queued.
    pub fn process(&mut self) -> Result<ProcessReport> {
        let mut report = ProcessReport::default();
        let drained = drain(&mut self.entries, self.config.failure_policy, &mut report);
        log_summary(&report, self.entries.len());
        drained.map(|()| report)
    }
}

/// Pops and executes entries from `entries` until it is empty or an abort.
pub(crate) fn drain(
    entries: &mut VecDeque<DeferredCall>,
    policy: FailurePolicy,
    report: &mut ProcessReport,
) -> Result<()> {
    while let Some(call) = entries.pop_front() {
        let position = report.executed;
        report.executed += 1;
        debug!("save: position={position} author={}", call.record.author());

        let Err((record, error)) = call.execute() else {
            continue;
        };
        warn!("save failed at position {position}: {error}");
        match policy {
            FailurePolicy::Continue => report.failures.push(SaveFailure {
                position,
                record,
                error,
            }),
            FailurePolicy::Abort => {
                return Err(Error::Aborted {
                    position,
                    source: Box::new(error),
                });
            }
        }
    }
    Ok(())
}

pub(crate) fn log_summary(report: &ProcessReport, remaining: usize) {
    info!(
        "processed {} deferred saves ({} failed, {} remaining)",
        report.executed,
        report.failures.len(),
        remaining
    );
}
