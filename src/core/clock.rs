use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::record::Timestamp;

/// Where callers get the instant stamped on a [`Record`](crate::record::Record).
///
/// The queue never reads a clock itself: callers take `now()` and hand the
/// value to `enqueue`.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Timestamp;
}

/// Wall-clock timestamps. Readings follow any system clock adjustment, so
/// two records enqueued back to back may carry decreasing timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(wall_clock_ns())
    }
}

/// Wall-clock time captured once at construction, advanced by `quanta`
/// ticks. Record timestamps from one instance are never decreasing.
#[derive(Debug, Clone)]
pub struct QuantaClock {
    ticks: quanta::Clock,
    anchor: quanta::Instant,
    anchor_ns: u64,
}

impl QuantaClock {
    pub fn new() -> Self {
        let ticks = quanta::Clock::new();
        Self {
            anchor: ticks.now(),
            anchor_ns: wall_clock_ns(),
            ticks,
        }
    }
}

impl Default for QuantaClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for QuantaClock {
    fn now(&self) -> Timestamp {
        let elapsed = self.ticks.now().duration_since(self.anchor);
        let elapsed_ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        Timestamp::from_nanos(self.anchor_ns.saturating_add(elapsed_ns))
    }
}

/// A deterministic clock: starts at a fixed instant and advances by `step`
/// on every reading.
#[derive(Debug)]
pub struct ManualClock {
    next_ns: AtomicU64,
    step_ns: u64,
}

impl ManualClock {
    pub fn new(start: Timestamp, step: Duration) -> Self {
        Self {
            next_ns: AtomicU64::new(start.as_nanos()),
            step_ns: u64::try_from(step.as_nanos()).unwrap_or(u64::MAX),
        }
    }

    /// A clock that always returns `at`.
    pub fn fixed(at: Timestamp) -> Self {
        Self::new(at, Duration::ZERO)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let ns = self
            .next_ns
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |ns| {
                Some(ns.saturating_add(self.step_ns))
            })
            .unwrap_or_else(|ns| ns);
        Timestamp::from_nanos(ns)
    }
}

fn wall_clock_ns() -> u64 {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX epoch");
    u64::try_from(timestamp.as_nanos()).expect("system time exceeds timestamp range")
}
