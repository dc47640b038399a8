use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use super::Envelope;
use crate::config::MetricsConfig;
use crate::error::ExportError;

/// Pushes envelopes to the metrics backend.
///
/// Cheap to clone; clones share the HTTP client and the in-flight count.
#[derive(Clone)]
pub struct Exporter {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    url: String,
    api_key: String,
    in_flight: AtomicUsize,
    max_in_flight: usize,
}

/// Releases one in-flight slot when the detached task ends, however it ends.
struct InFlightSlot(Arc<Inner>);

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Exporter {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
        max_in_flight: usize,
    ) -> Result<Self, ExportError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                url: url.into(),
                api_key: api_key.into(),
                in_flight: AtomicUsize::new(0),
                max_in_flight: max_in_flight.max(1),
            }),
        })
    }

    pub fn from_config(cfg: &MetricsConfig) -> Result<Self, ExportError> {
        Self::new(
            cfg.url.clone(),
            cfg.api_key.clone(),
            Duration::from_millis(cfg.request_timeout_ms),
            cfg.max_in_flight,
        )
    }

    /// Requests dispatched but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Fire-and-forget: spawn one detached request for this envelope.
    ///
    /// Failures are logged inside the task and go no further. Returns
    /// `false` when the envelope was dropped instead of dispatched (encode
    /// failure, or the in-flight cap is reached).
    pub fn export(&self, envelope: Envelope) -> bool {
        let name = envelope.metric_name().to_owned();
        let body = match envelope.to_json() {
            Ok(body) => body,
            Err(e) => {
                warn!(metric = %name, error = %e, "failed to encode metric");
                return false;
            }
        };

        let Some(slot) = self.reserve() else {
            warn!(
                metric = %name,
                in_flight = self.in_flight(),
                max_in_flight = self.inner.max_in_flight,
                "too many metric exports in flight, dropping"
            );
            return false;
        };

        let inner = self.inner.clone();
        tokio::spawn(async move {
            let _slot = slot;
            match post(&inner, body.clone()).await {
                Ok(()) => debug!(metric = %name, "pushed metric"),
                Err(e) => warn!(
                    metric = %name,
                    error = %e,
                    payload = %body,
                    "failed to push metric"
                ),
            }
        });
        true
    }

    /// One awaited transmission. Non-2xx responses become
    /// `ExportError::Rejected` carrying the response body.
    pub async fn send(&self, envelope: &Envelope) -> Result<(), ExportError> {
        let body = envelope.to_json()?;
        post(&self.inner, body).await
    }

    fn reserve(&self) -> Option<InFlightSlot> {
        let prev = self.inner.in_flight.fetch_add(1, Ordering::AcqRel);
        let slot = InFlightSlot(self.inner.clone());
        if prev >= self.inner.max_in_flight {
            // dropping the slot gives the count back
            drop(slot);
            return None;
        }
        Some(slot)
    }
}

async fn post(inner: &Inner, body: String) -> Result<(), ExportError> {
    let response = inner
        .client
        .post(&inner.url)
        .bearer_auth(&inner.api_key)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(ExportError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_flight_cap_is_at_least_one() {
        let exporter =
            Exporter::new("http://127.0.0.1:9/", "key", Duration::from_secs(1), 0).unwrap();
        assert_eq!(exporter.inner.max_in_flight, 1);
        assert_eq!(exporter.in_flight(), 0);
    }

    #[test]
    fn reserve_respects_cap() {
        let exporter =
            Exporter::new("http://127.0.0.1:9/", "key", Duration::from_secs(1), 2).unwrap();
        let a = exporter.reserve().expect("first slot");
        let b = exporter.reserve().expect("second slot");
        assert!(exporter.reserve().is_none());
        assert_eq!(exporter.in_flight(), 2);

        drop(a);
        assert_eq!(exporter.in_flight(), 1);
        let _c = exporter.reserve().expect("slot freed");
        drop(b);
    }
}
