//! In-process metrics aggregator for the pizza service.
//!
//! Request handlers feed a [`metrics::MetricsCollector`]; a background
//! [`metrics::Scheduler`] periodically snapshots it and pushes each metric
//! to an OTLP-style HTTP backend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod mock_data;
pub mod server;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Metrics engine — handlers push samples, the flush scheduler drains it.
    pub metrics: Arc<metrics::MetricsCollector>,

    /// Seeded login accounts.
    pub users: mock_data::UserDirectory,

    /// Live session tokens → user email.
    pub sessions: Mutex<HashMap<String, String>>,
}

impl AppState {
    pub fn new(metrics: Arc<metrics::MetricsCollector>) -> Self {
        Self {
            metrics,
            users: mock_data::UserDirectory::seeded(),
            sessions: Mutex::new(HashMap::new()),
        }
    }
}
