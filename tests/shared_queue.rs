use std::io;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use saveq::{
    Error, Journal, QueueConfig, Record, RecordingSink, Result, SharedCallQueue, Sink, Timestamp,
};

const PRODUCERS: usize = 4;
const PER_PRODUCER: usize = 250;

#[test]
fn concurrent_producers_keep_per_producer_order() {
    let journal = Journal::new();
    let queue = SharedCallQueue::new();

    thread::scope(|s| {
        for p in 0..PRODUCERS {
            let queue = queue.clone();
            let sink: Arc<dyn Sink> = Arc::new(RecordingSink::new(format!("p{p}"), journal.clone()));
            s.spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue
                        .enqueue(&sink, Timestamp::from_nanos(i as u64), format!("{i}"), "producer")
                        .expect("enqueue");
                }
            });
        }
    });

    assert_eq!(queue.len().expect("len"), PRODUCERS * PER_PRODUCER);
    let report = queue.process().expect("process");
    assert_eq!(report.executed, PRODUCERS * PER_PRODUCER);
    assert!(queue.is_empty().expect("is_empty"));

    let entries = journal.entries();
    for p in 0..PRODUCERS {
        let label = format!("p{p}");
        let seen: Vec<usize> = entries
            .iter()
            .filter(|entry| entry.label == label)
            .map(|entry| entry.record.text().parse().expect("index"))
            .collect();
        assert_eq!(seen, (0..PER_PRODUCER).collect::<Vec<_>>());
    }
}

/// Enqueues a follow-up entry on the same queue from inside `save`.
struct Reentrant {
    queue: SharedCallQueue,
    follow_up: Arc<dyn Sink>,
}

impl Sink for Reentrant {
    fn save(&self, record: &Record) -> Result<()> {
        self.queue
            .enqueue(&self.follow_up, record.timestamp(), "follow-up", record.author())
    }
}

#[test]
fn entries_added_during_process_wait_for_next_call() {
    let journal = Journal::new();
    let queue = SharedCallQueue::new();
    let follow_up: Arc<dyn Sink> = Arc::new(RecordingSink::new("follow", journal.clone()));
    let reentrant: Arc<dyn Sink> = Arc::new(Reentrant {
        queue: queue.clone(),
        follow_up,
    });

    queue
        .enqueue(&reentrant, Timestamp::from_nanos(1), "trigger", "x")
        .expect("enqueue");

    let report = queue.process().expect("first");
    assert_eq!(report.executed, 1);
    assert_eq!(queue.len().expect("len"), 1);
    assert!(journal.is_empty());

    let report = queue.process().expect("second");
    assert_eq!(report.executed, 1);
    assert_eq!(journal.len(), 1);
    assert!(queue.is_empty().expect("is_empty"));
}

struct FailingSink;

impl Sink for FailingSink {
    fn save(&self, _record: &Record) -> Result<()> {
        Err(Error::Io(io::Error::new(io::ErrorKind::Other, "unreachable")))
    }
}

#[test]
fn abort_puts_unexecuted_entries_back_in_order() {
    let journal = Journal::new();
    let ok: Arc<dyn Sink> = Arc::new(RecordingSink::new("ok", journal.clone()));
    let bad: Arc<dyn Sink> = Arc::new(FailingSink);
    let queue = SharedCallQueue::with_config(QueueConfig::abort_on_error());

    queue.enqueue(&bad, Timestamp::from_nanos(1), "fails", "x").expect("enqueue");
    queue.enqueue(&ok, Timestamp::from_nanos(2), "kept 1", "x").expect("enqueue");
    queue.enqueue(&ok, Timestamp::from_nanos(3), "kept 2", "x").expect("enqueue");

    let err = queue.process().unwrap_err();
    assert!(matches!(err, Error::Aborted { position: 0, .. }));
    assert_eq!(queue.len().expect("len"), 2);

    queue.process().expect("resume");
    let texts: Vec<_> = journal
        .entries()
        .into_iter()
        .map(|entry| entry.record.text().to_string())
        .collect();
    assert_eq!(texts, ["kept 1", "kept 2"]);
}

/// Signals when its save starts, then blocks until released.
struct GateSink {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl Sink for GateSink {
    fn save(&self, _record: &Record) -> Result<()> {
        self.entered
            .lock()
            .map_err(|_| Error::Poisoned("gate"))?
            .send(())
            .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::Other, err)))?;
        self.release
            .lock()
            .map_err(|_| Error::Poisoned("gate"))?
            .recv()
            .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::Other, err)))?;
        Ok(())
    }
}

#[test]
fn overlapping_process_calls_keep_fifo_order() {
    let journal = Journal::new();
    let recorder: Arc<dyn Sink> = Arc::new(RecordingSink::new("r", journal.clone()));
    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let gate: Arc<dyn Sink> = Arc::new(GateSink {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let queue = SharedCallQueue::new();

    queue.enqueue(&gate, Timestamp::from_nanos(1), "gate", "x").expect("enqueue");
    queue.enqueue(&recorder, Timestamp::from_nanos(2), "first", "x").expect("enqueue");

    let executed = thread::scope(|s| {
        let first_drain = s.spawn(|| queue.process().expect("first drain").executed);
        entered_rx.recv().expect("gate entered");

        queue
            .enqueue(&recorder, Timestamp::from_nanos(3), "second", "x")
            .expect("enqueue");
        let second_drain = s.spawn(|| queue.process().expect("second drain").executed);

        // Give the second drain time to reach the drain lock before the gate opens.
        thread::sleep(Duration::from_millis(50));
        release_tx.send(()).expect("release gate");

        first_drain.join().expect("first join") + second_drain.join().expect("second join")
    });

    assert_eq!(executed, 3);
    assert!(queue.is_empty().expect("is_empty"));
    let texts: Vec<_> = journal
        .entries()
        .into_iter()
        .map(|entry| entry.record.text().to_string())
        .collect();
    assert_eq!(texts, ["first", "second"]);
}
