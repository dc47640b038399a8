use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::AppState;

/// Request-tracking middleware applied to every route:
///
///   - counts the request under its HTTP method
///   - records start-to-finish wall time into the endpoint latency window
///   - adds a `Server-Timing` response header with the same duration
pub async fn track_requests(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    state.metrics.record_request(&method);

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();
    state.metrics.record_endpoint_latency(elapsed);

    let server_timing =
        format!("total;dur={:.3}", elapsed.as_secs_f64() * 1000.0);
    if let Ok(val) = server_timing.parse() {
        response.headers_mut().insert("Server-Timing", val);
    }

    let status = response.status().as_u16();
    debug!(%method, %path, status, us = elapsed.as_micros() as u64, "request");

    response
}

/// Wraps the order route only: time spent creating a pizza order.
pub async fn time_pizza_creation(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(req).await;
    state.metrics.record_pizza_latency(start.elapsed());
    response
}
