//! OTLP-style JSON envelope, one metric per envelope.
//!
//! Shape on the wire:
//!
//! ```text
//! { "resourceMetrics": [{ "scopeMetrics": [{ "metrics": [{
//!     "name": .., "unit": ..,
//!     "sum" | "gauge": { "dataPoints": [{ "asInt": .., "timeUnixNano": .. }], .. }
//! }]}]}]}
//! ```

use chrono::Utc;
use serde::Serialize;

use super::{MetricKind, MetricSnapshot};

const CUMULATIVE: &str = "AGGREGATION_TEMPORALITY_CUMULATIVE";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub resource_metrics: Vec<ResourceMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetrics {
    pub scope_metrics: Vec<ScopeMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeMetrics {
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    pub unit: String,
    #[serde(flatten)]
    pub data: MetricData,
}

/// Keyed by kind on the wire: `"sum": {..}` or `"gauge": {..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricData {
    Sum(SumData),
    Gauge(GaugeData),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SumData {
    pub data_points: Vec<DataPoint>,
    pub aggregation_temporality: &'static str,
    pub is_monotonic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeData {
    pub data_points: Vec<DataPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub as_int: i64,
    pub time_unix_nano: i64,
}

impl Envelope {
    /// Encode a snapshot stamped with the current wall-clock time.
    pub fn encode(snapshot: &MetricSnapshot) -> Self {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Self::encode_at(snapshot, now)
    }

    pub fn encode_at(snapshot: &MetricSnapshot, time_unix_nano: i64) -> Self {
        let data_points = vec![DataPoint {
            as_int: snapshot.value,
            time_unix_nano,
        }];
        let data = match snapshot.kind {
            MetricKind::Sum => MetricData::Sum(SumData {
                data_points,
                aggregation_temporality: CUMULATIVE,
                is_monotonic: true,
            }),
            MetricKind::Gauge => MetricData::Gauge(GaugeData { data_points }),
        };

        Self {
            resource_metrics: vec![ResourceMetrics {
                scope_metrics: vec![ScopeMetrics {
                    metrics: vec![Metric {
                        name: snapshot.name.to_owned(),
                        unit: snapshot.unit.to_owned(),
                        data,
                    }],
                }],
            }],
        }
    }

    /// Name of the (single) metric carried, for log lines.
    pub fn metric_name(&self) -> &str {
        self.resource_metrics
            .first()
            .and_then(|r| r.scope_metrics.first())
            .and_then(|s| s.metrics.first())
            .map(|m| m.name.as_str())
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
