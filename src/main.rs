use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use pizza_metrics::metrics::{Exporter, HostSensor, MetricsCollector, Scheduler};
use pizza_metrics::{config, server, AppState};

const DEFAULT_CONFIG: &str = "pizza-metrics.yaml";

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── 1. Load config ───────────────────────────────────────────
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.into());
    let cfg = config::load_from_file(&path).expect("config load failed");

    // ── 2. Build the metrics pipeline ────────────────────────────
    let metrics = Arc::new(MetricsCollector::new());
    let exporter = Exporter::from_config(&cfg.metrics).expect("failed to build HTTP client");
    let flush = Scheduler::new(
        metrics.clone(),
        exporter,
        Arc::new(HostSensor::new()),
        Duration::from_millis(cfg.metrics.period_ms),
    )
    .with_reset(cfg.metrics.counter_reset)
    .start();

    // ── 3. Build Axum router ─────────────────────────────────────
    let state = Arc::new(AppState::new(metrics));
    let app = server::create_router(state);

    // ── 4. Bind & serve ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&cfg.server.listen)
        .await
        .expect("failed to bind");
    tracing::info!(
        listen = %cfg.server.listen,
        metrics_url = %cfg.metrics.url,
        "pizza-metrics starting"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("server exited with error");

    flush.shutdown();
}
