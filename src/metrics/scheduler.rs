use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;
use tracing::{debug, info};

use super::{CounterReset, Envelope, Exporter, MetricsCollector, Sensor};

/// Periodic flush loop: sample sensors, snapshot every family, export each.
///
/// Idle until [`Scheduler::start`], which moves it onto a background task.
pub struct Scheduler {
    metrics: Arc<MetricsCollector>,
    exporter: Exporter,
    sensor: Arc<dyn Sensor>,
    period: Duration,
    reset: CounterReset,
    cycles: Arc<AtomicU64>,
}

/// Shortest period accepted; `tokio::time::interval` panics on zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Owns the running flush task. Dropping it stops the loop.
pub struct FlushHandle {
    task: JoinHandle<()>,
    cycles: Arc<AtomicU64>,
}

impl Scheduler {
    pub fn new(
        metrics: Arc<MetricsCollector>,
        exporter: Exporter,
        sensor: Arc<dyn Sensor>,
        period: Duration,
    ) -> Self {
        Self {
            metrics,
            exporter,
            sensor,
            period: period.max(MIN_PERIOD),
            reset: CounterReset::default(),
            cycles: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_reset(mut self, reset: CounterReset) -> Self {
        self.reset = reset;
        self
    }

    /// One flush cycle. Only bookkeeping happens here; every export is a
    /// detached request that this call never waits on.
    pub fn tick(&self) {
        self.metrics.set_cpu(self.sensor.cpu_percent());
        self.metrics.set_memory(self.sensor.memory_percent());

        let snapshots = self.metrics.snapshot_all(self.reset);
        let total = snapshots.len();
        let mut dispatched = 0;
        for snapshot in &snapshots {
            if self.exporter.export(Envelope::encode(snapshot)) {
                dispatched += 1;
            }
        }

        let cycle = self.cycles.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(cycle, dispatched, total, "flush cycle");
    }

    /// Spawn the loop. First flush happens one period after start.
    pub fn start(self) -> FlushHandle {
        let cycles = self.cycles.clone();
        info!(
            period_ms = self.period.as_millis() as u64,
            reset = ?self.reset,
            "metrics flush started"
        );

        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + self.period, self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = IntervalStream::new(interval);

            while ticks.next().await.is_some() {
                self.tick();
            }
        });

        FlushHandle { task, cycles }
    }
}

impl FlushHandle {
    /// Completed flush cycles so far.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Acquire)
    }

    pub fn shutdown(self) {
        info!(cycles = self.cycles(), "metrics flush stopped");
        // Drop aborts the task.
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for FlushHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSensor;

    impl Sensor for FixedSensor {
        fn cpu_percent(&self) -> i64 {
            12
        }
        fn memory_percent(&self) -> i64 {
            48
        }
    }

    fn scheduler(metrics: Arc<MetricsCollector>, period: Duration) -> Scheduler {
        // Nothing listens on the discard port; exports fail quietly.
        let exporter =
            Exporter::new("http://127.0.0.1:9/", "key", Duration::from_millis(200), 64).unwrap();
        Scheduler::new(metrics, exporter, Arc::new(FixedSensor), period)
    }

    #[tokio::test]
    async fn tick_samples_sensors_and_resets_counters() {
        let metrics = Arc::new(MetricsCollector::new());
        metrics.pizza_sold();
        metrics.record_endpoint_latency(Duration::from_millis(5));

        let s = scheduler(metrics.clone(), Duration::from_secs(60));
        s.tick();

        assert_eq!(metrics.cpu.get(), 12);
        assert_eq!(metrics.memory.get(), 48);
        assert_eq!(metrics.pizzas_sold.get(), 0);
        assert!(metrics.endpoint_latency.is_empty());
        assert_eq!(s.cycles.load(Ordering::Acquire), 1);
    }

    #[tokio::test]
    async fn never_reset_keeps_counters() {
        let metrics = Arc::new(MetricsCollector::new());
        metrics.pizza_sold();

        let s = scheduler(metrics.clone(), Duration::from_secs(60)).with_reset(CounterReset::Never);
        s.tick();
        s.tick();

        assert_eq!(metrics.pizzas_sold.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_period() {
        let metrics = Arc::new(MetricsCollector::new());
        let handle = scheduler(metrics, Duration::from_millis(100)).start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.cycles(), 0);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(handle.cycles() >= 10, "cycles {}", handle.cycles());
        assert!(handle.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_clamped() {
        let metrics = Arc::new(MetricsCollector::new());
        let s = scheduler(metrics, Duration::ZERO);
        assert_eq!(s.period, MIN_PERIOD);

        let handle = s.start();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.cycles() >= 1);
        assert!(handle.is_running());
    }

    #[tokio::test]
    async fn dropping_handle_stops_the_loop() {
        let metrics = Arc::new(MetricsCollector::new());
        let handle = scheduler(metrics, Duration::from_millis(10)).start();
        let cycles = handle.cycles.clone();
        handle.shutdown();

        tokio::time::sleep(Duration::from_millis(50)).await;
        let after = cycles.load(Ordering::Acquire);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cycles.load(Ordering::Acquire), after);
    }
}
