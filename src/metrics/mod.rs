pub mod collector;
pub mod envelope;
pub mod exporter;
pub mod family;
pub mod scheduler;
pub mod sensor;

pub use collector::MetricsCollector;
pub use envelope::Envelope;
pub use exporter::Exporter;
pub use family::{Counter, Gauge, LatencyWindow};
pub use scheduler::{FlushHandle, Scheduler};
pub use sensor::{HostSensor, Sensor};

use serde::Deserialize;

/// How the backend should interpret a data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Cumulative, monotonic sum.
    Sum,
    /// Instantaneous value.
    Gauge,
}

/// What a counter does when it is flushed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterReset {
    /// Zero after every flush: each export carries the last window only.
    #[default]
    OnFlush,
    /// Keep running since process start.
    Never,
}

/// A single flushed reading.
/// This is the "read" side — the scheduler produces these and everything
/// downstream (encoding, export) works on them, never on live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    /// e.g. "get requests"
    pub name: &'static str,
    pub value: i64,
    pub kind: MetricKind,
    /// "1", "%", "ms"
    pub unit: &'static str,
}
