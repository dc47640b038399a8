use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::{CounterReset, MetricKind, MetricSnapshot};

// ─── Counter ─────────────────────────────────────────────────────

/// Integer counter exported as a cumulative sum.
/// Request handlers call `increment()` / `add()`, the scheduler calls
/// `snapshot()`.
#[derive(Debug)]
pub struct Counter {
    name: &'static str,
    unit: &'static str,
    value: AtomicI64,
}

impl Counter {
    pub const fn new(name: &'static str, unit: &'static str) -> Self {
        Self {
            name,
            unit,
            value: AtomicI64::new(0),
        }
    }

    pub fn increment(&self) {
        self.add(1);
    }

    pub fn decrement(&self) {
        self.add(-1);
    }

    pub fn add(&self, delta: i64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    /// Current value without touching it.
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Read the counter and, under `OnFlush`, zero it in the same atomic
    /// step so no concurrent increment falls between read and reset.
    pub fn snapshot(&self, reset: CounterReset) -> MetricSnapshot {
        let value = match reset {
            CounterReset::OnFlush => self.value.swap(0, Ordering::AcqRel),
            CounterReset::Never => self.value.load(Ordering::Acquire),
        };
        MetricSnapshot {
            name: self.name,
            value,
            kind: MetricKind::Sum,
            unit: self.unit,
        }
    }
}

// ─── Gauge ───────────────────────────────────────────────────────

/// Instantaneous value. Last write wins and flushing never resets it.
#[derive(Debug)]
pub struct Gauge {
    name: &'static str,
    unit: &'static str,
    value: AtomicI64,
}

impl Gauge {
    pub const fn new(name: &'static str, unit: &'static str) -> Self {
        Self {
            name,
            unit,
            value: AtomicI64::new(0),
        }
    }

    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Relative adjustment, for gauges that track a population
    /// (e.g. active users).
    pub fn add(&self, delta: i64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            name: self.name,
            value: self.get(),
            kind: MetricKind::Gauge,
            unit: self.unit,
        }
    }
}

// ─── Latency window ──────────────────────────────────────────────

/// Mean of all durations recorded since the last flush.
///
/// Samples are folded into a running `(sum, count)` pair instead of being
/// buffered, so memory stays constant no matter how many requests land in
/// one window. The observable mean is the same.
#[derive(Debug)]
pub struct LatencyWindow {
    name: &'static str,
    unit: &'static str,
    window: Mutex<WindowAccumulator>,
}

/// Running totals for the open window.
#[derive(Debug, Default, Clone, Copy)]
struct WindowAccumulator {
    sum_ms: f64,
    count: u64,
}

impl WindowAccumulator {
    /// Truncated mean; an empty window averages to zero.
    fn mean(&self) -> i64 {
        if self.count == 0 {
            return 0;
        }
        (self.sum_ms / self.count as f64) as i64
    }
}

impl LatencyWindow {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            unit: "ms",
            window: Mutex::new(WindowAccumulator::default()),
        }
    }

    pub fn record(&self, elapsed: Duration) {
        self.record_ms(elapsed.as_micros() as f64 / 1000.0);
    }

    /// Append one sample. Negative values are accepted as-is.
    pub fn record_ms(&self, ms: f64) {
        let mut w = self.window.lock();
        w.sum_ms += ms;
        w.count += 1;
    }

    /// Number of samples in the open window.
    pub fn len(&self) -> u64 {
        self.window.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take(&self) -> WindowAccumulator {
        std::mem::take(&mut *self.window.lock())
    }

    /// Close the current window and open a fresh one.
    ///
    /// Latency is always windowed regardless of the counter policy: a mean
    /// over everything since start would flatten every spike.
    pub fn snapshot(&self) -> MetricSnapshot {
        let closed = self.take();
        MetricSnapshot {
            name: self.name,
            value: closed.mean(),
            kind: MetricKind::Sum,
            unit: self.unit,
        }
    }
}
