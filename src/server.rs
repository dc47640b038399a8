use axum::{
    middleware as axum_mw,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and the metrics middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    // ── Order endpoint, timed on its own ────────────────────────
    let orders: Router<Arc<AppState>> = Router::new()
        .route("/api/order", post(handlers::order::create_order))
        .route_layer(axum_mw::from_fn_with_state(
            state.clone(),
            timing::time_pizza_creation,
        ));

    Router::new()
        // ── Menu ────────────────────────────────────────────────
        .route("/api/menu", get(handlers::menu::get_menu))
        // ── Auth ────────────────────────────────────────────────
        .route(
            "/api/auth",
            put(handlers::auth::login).delete(handlers::auth::logout),
        )
        .merge(orders)
        // ── Provide shared state to all routes above ────────────
        .with_state(state.clone())
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn_with_state(state, timing::track_requests))
        .layer(CorsLayer::permissive())
}
