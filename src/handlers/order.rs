use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::mock_data;
use crate::AppState;

use super::{bearer_token, AppError};

// ─── Domain types ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "menuId")]
    pub menu_id: u32,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "franchiseId")]
    pub franchise_id: u32,
    #[serde(rename = "storeId")]
    pub store_id: u32,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize)]
pub struct Order {
    pub id: String,
    #[serde(rename = "franchiseId")]
    pub franchise_id: u32,
    #[serde(rename = "storeId")]
    pub store_id: u32,
    pub items: Vec<OrderItem>,
    pub total: f64,
}

// ─── POST /api/order ─────────────────────────────────────────────

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    if !state.sessions.lock().contains_key(token) {
        return Err(AppError::Unauthorized);
    }

    if let Err(reason) = validate_items(&req.items) {
        state.metrics.pizza_creation_failed();
        warn!(%reason, "order rejected");
        return Err(AppError::BadRequest(reason));
    }

    let total: f64 = req.items.iter().map(|i| i.price).sum();
    for _ in &req.items {
        state.metrics.pizza_sold();
    }
    state.metrics.add_revenue(total);

    Ok(Json(Order {
        id: Uuid::new_v4().to_string(),
        franchise_id: req.franchise_id,
        store_id: req.store_id,
        items: req.items,
        total,
    }))
}

/// Every item must reference a menu entry at its listed price.
fn validate_items(items: &[OrderItem]) -> Result<(), String> {
    if items.is_empty() {
        return Err("order must contain at least one item".into());
    }
    let menu = mock_data::menu();
    for item in items {
        let Some(entry) = menu.iter().find(|m| m.id == item.menu_id) else {
            return Err(format!("unknown menu item {}", item.menu_id));
        };
        if (entry.price - item.price).abs() > f64::EPSILON {
            return Err(format!("price mismatch for menu item {}", item.menu_id));
        }
    }
    Ok(())
}
