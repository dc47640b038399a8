use std::time::Duration;

use axum::http::Method;

use super::family::{Counter, Gauge, LatencyWindow};
use super::{CounterReset, MetricSnapshot};

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe metrics engine for the pizza service.
/// Handlers and middleware call the `record_*` hooks, the flush scheduler
/// calls `snapshot_all()`.
///
/// Built once at startup and shared through `Arc`; every family is
/// individually atomic, so a full snapshot is not a single point in time.
#[derive(Debug)]
pub struct MetricsCollector {
    // Host gauges, refreshed by the scheduler on every tick
    pub cpu: Gauge,
    pub memory: Gauge,

    // HTTP
    pub get_requests: Counter,
    pub put_requests: Counter,
    pub post_requests: Counter,
    pub delete_requests: Counter,

    // Auth
    pub successful_logins: Counter,
    pub failed_logins: Counter,
    pub active_users: Gauge,

    // Orders
    pub pizzas_sold: Counter,
    /// Hundredths of the currency unit.
    pub revenue: Counter,
    pub pizza_creation_failures: Counter,

    // Latency
    pub pizza_latency: LatencyWindow,
    pub endpoint_latency: LatencyWindow,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ─── MetricsCollector impl ───────────────────────────────────────

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            cpu: Gauge::new("cpu", "%"),
            memory: Gauge::new("memory", "%"),
            get_requests: Counter::new("get requests", "1"),
            put_requests: Counter::new("put requests", "1"),
            post_requests: Counter::new("post requests", "1"),
            delete_requests: Counter::new("delete requests", "1"),
            successful_logins: Counter::new("successful logins", "1"),
            failed_logins: Counter::new("unsuccessful logins", "1"),
            active_users: Gauge::new("active users", "1"),
            pizzas_sold: Counter::new("pizzas sold", "1"),
            revenue: Counter::new("revenue", "1"),
            pizza_creation_failures: Counter::new("pizza creation failures", "1"),
            pizza_latency: LatencyWindow::new("pizza creation latency"),
            endpoint_latency: LatencyWindow::new("endpoint latency"),
        }
    }

    // ── Request hooks ───────────────────────────────────────────

    /// Count one request by HTTP method. Other methods are not tracked.
    pub fn record_request(&self, method: &Method) {
        let counter = match *method {
            Method::GET => &self.get_requests,
            Method::PUT => &self.put_requests,
            Method::POST => &self.post_requests,
            Method::DELETE => &self.delete_requests,
            _ => return,
        };
        counter.increment();
    }

    pub fn record_auth(&self, success: bool) {
        if success {
            self.successful_logins.increment();
        } else {
            self.failed_logins.increment();
        }
    }

    pub fn user_logged_in(&self) {
        self.active_users.add(1);
    }

    pub fn user_logged_out(&self) {
        self.active_users.add(-1);
    }

    pub fn pizza_sold(&self) {
        self.pizzas_sold.increment();
    }

    pub fn pizza_creation_failed(&self) {
        self.pizza_creation_failures.increment();
    }

    /// Add a sale amount, stored as an integer number of hundredths.
    pub fn add_revenue(&self, price: f64) {
        self.revenue.add((price * 100.0).round() as i64);
    }

    pub fn record_endpoint_latency(&self, elapsed: Duration) {
        self.endpoint_latency.record(elapsed);
    }

    pub fn record_pizza_latency(&self, elapsed: Duration) {
        self.pizza_latency.record(elapsed);
    }

    // ── Sensor hooks ────────────────────────────────────────────

    pub fn set_cpu(&self, pct: i64) {
        self.cpu.set(pct);
    }

    pub fn set_memory(&self, pct: i64) {
        self.memory.set(pct);
    }

    // ── Flush ───────────────────────────────────────────────────

    /// Snapshot every family in export order, resetting counters per
    /// `reset` and always closing the latency windows.
    pub fn snapshot_all(&self, reset: CounterReset) -> Vec<MetricSnapshot> {
        let mut out = Vec::with_capacity(14);

        out.push(self.cpu.snapshot());
        out.push(self.memory.snapshot());

        for counter in [
            &self.get_requests,
            &self.put_requests,
            &self.post_requests,
            &self.delete_requests,
            &self.successful_logins,
            &self.failed_logins,
        ] {
            out.push(counter.snapshot(reset));
        }
        out.push(self.active_users.snapshot());

        for counter in [
            &self.pizzas_sold,
            &self.revenue,
            &self.pizza_creation_failures,
        ] {
            out.push(counter.snapshot(reset));
        }

        out.push(self.pizza_latency.snapshot());
        out.push(self.endpoint_latency.snapshot());

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricKind;
    use std::sync::Arc;

    fn value_of(snaps: &[MetricSnapshot], name: &str) -> i64 {
        snaps
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.value)
            .unwrap_or_else(|| panic!("no metric named {name}"))
    }

    #[test]
    fn requests_are_counted_by_method() {
        let m = MetricsCollector::new();
        m.record_request(&Method::GET);
        m.record_request(&Method::GET);
        m.record_request(&Method::PUT);
        m.record_request(&Method::DELETE);
        m.record_request(&Method::PATCH);

        let snaps = m.snapshot_all(CounterReset::OnFlush);
        assert_eq!(value_of(&snaps, "get requests"), 2);
        assert_eq!(value_of(&snaps, "put requests"), 1);
        assert_eq!(value_of(&snaps, "post requests"), 0);
        assert_eq!(value_of(&snaps, "delete requests"), 1);
    }

    #[test]
    fn snapshot_order_and_kinds() {
        let m = MetricsCollector::new();
        let snaps = m.snapshot_all(CounterReset::OnFlush);
        let names: Vec<_> = snaps.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            [
                "cpu",
                "memory",
                "get requests",
                "put requests",
                "post requests",
                "delete requests",
                "successful logins",
                "unsuccessful logins",
                "active users",
                "pizzas sold",
                "revenue",
                "pizza creation failures",
                "pizza creation latency",
                "endpoint latency",
            ]
        );
        let gauges: Vec<_> = snaps
            .iter()
            .filter(|s| s.kind == MetricKind::Gauge)
            .map(|s| s.name)
            .collect();
        assert_eq!(gauges, ["cpu", "memory", "active users"]);
    }

    #[test]
    fn flush_resets_counters_but_not_gauges() {
        let m = MetricsCollector::new();
        m.record_auth(true);
        m.record_auth(false);
        m.record_auth(false);
        m.user_logged_in();
        m.user_logged_in();
        m.user_logged_out();
        m.set_cpu(33);

        let first = m.snapshot_all(CounterReset::OnFlush);
        assert_eq!(value_of(&first, "successful logins"), 1);
        assert_eq!(value_of(&first, "unsuccessful logins"), 2);
        assert_eq!(value_of(&first, "active users"), 1);

        let second = m.snapshot_all(CounterReset::OnFlush);
        assert_eq!(value_of(&second, "successful logins"), 0);
        assert_eq!(value_of(&second, "unsuccessful logins"), 0);
        assert_eq!(value_of(&second, "active users"), 1);
        assert_eq!(value_of(&second, "cpu"), 33);
    }

    #[test]
    fn never_policy_still_clears_latency() {
        let m = MetricsCollector::new();
        m.pizza_sold();
        m.record_endpoint_latency(Duration::from_millis(12));

        let first = m.snapshot_all(CounterReset::Never);
        assert_eq!(value_of(&first, "pizzas sold"), 1);
        assert_eq!(value_of(&first, "endpoint latency"), 12);

        m.pizza_sold();
        let second = m.snapshot_all(CounterReset::Never);
        assert_eq!(value_of(&second, "pizzas sold"), 2);
        assert_eq!(value_of(&second, "endpoint latency"), 0);
    }

    #[test]
    fn flushing_while_handlers_write_loses_nothing() {
        let m = Arc::new(MetricsCollector::new());
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let m = m.clone();
                std::thread::spawn(move || {
                    for _ in 0..100_000 {
                        m.pizza_sold();
                        m.record_endpoint_latency(Duration::from_millis(3));
                    }
                })
            })
            .collect();

        let mut sold = 0;
        let mut flushes = 0;
        while !writers.iter().all(|h| h.is_finished()) {
            let snaps = m.snapshot_all(CounterReset::OnFlush);
            sold += value_of(&snaps, "pizzas sold");
            let latency = value_of(&snaps, "endpoint latency");
            assert!(latency == 0 || latency == 3, "latency mean {latency}");
            flushes += 1;
        }
        for h in writers {
            h.join().unwrap();
        }
        sold += value_of(&m.snapshot_all(CounterReset::OnFlush), "pizzas sold");

        assert_eq!(sold, 400_000, "over {flushes} flushes");
        assert!(m.endpoint_latency.is_empty());
    }

    #[test]
    fn revenue_is_kept_in_hundredths() {
        let m = MetricsCollector::new();
        m.add_revenue(0.0042);
        m.add_revenue(12.99);
        m.add_revenue(0.05);
        // 0.0042 rounds to zero hundredths
        assert_eq!(m.revenue.get(), 1304);
    }
}
