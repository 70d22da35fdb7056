//! Multi-producer handle over a [`CallQueue`].
//!
//! Appends and the hand-off of pending entries happen under the queue lock,
//! so FIFO order across producers is the order in which they took it. A
//! second lock serializes whole drains: a `process` call started while
//! another is running waits for it, so saves never overtake each other.
//! Saves run with the queue lock released: producers are never blocked by a
//! slow sink, and anything enqueued mid-drain waits for the next `process`.
//!
//! Calling `process` from inside a `save` on the same queue deadlocks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::{Error, QueueConfig, Result};
use crate::queue::{drain, log_summary, CallQueue, DeferredCall, ProcessReport};
use crate::record::{Record, Timestamp};
use crate::sink::Sink;

#[derive(Debug, Clone, Default)]
pub struct SharedCallQueue {
    inner: Arc<Mutex<CallQueue>>,
    drain_lock: Arc<Mutex<()>>,
}

impl SharedCallQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CallQueue::with_config(config))),
            drain_lock: Arc::default(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CallQueue>> {
        self.inner.lock().map_err(|_| Error::Poisoned("call queue"))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    pub fn enqueue(
        &self,
        sink: &Arc<dyn Sink>,
        timestamp: Timestamp,
        text: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<()> {
        self.enqueue_record(sink, Record::new(timestamp, text, author))
    }

    pub fn enqueue_record(&self, sink: &Arc<dyn Sink>, record: Record) -> Result<()> {
        self.lock()?.push(DeferredCall::new(Arc::clone(sink), record));
        Ok(())
    }

    /// Drain every entry pending at the time of the call.
    ///
    /// Failure handling follows the queue's [`FailurePolicy`](crate::core::FailurePolicy).
    /// On abort, entries not yet executed are put back at the head of the
    /// queue, ahead of anything enqueued while the drain was running.
    pub fn process(&self) -> Result<ProcessReport> {
        // Guards no data; a save that panicked leaves nothing to repair.
        let _draining = self
            .drain_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let (mut pending, policy) = {
            let mut queue = self.lock()?;
            let policy = queue.config().failure_policy;
            (queue.take_entries(), policy)
        };

        let mut report = ProcessReport::default();
        let drained = drain(&mut pending, policy, &mut report);

        // Unexecuted entries must go back even if a producer panicked meanwhile.
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !pending.is_empty() {
            pending.extend(queue.take_entries());
            queue.replace_entries(pending);
        }
        log_summary(&report, queue.len());
        drained.map(|()| report)
    }
}
