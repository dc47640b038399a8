use axum::Json;

use crate::mock_data::{self, MenuItem};

// ─── GET /api/menu ───────────────────────────────────────────────

pub async fn get_menu() -> Json<Vec<MenuItem>> {
    Json(mock_data::menu())
}
