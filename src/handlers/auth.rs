use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::AppState;

use super::{bearer_token, AppError};

// ─── Request / response types ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub name: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

// ─── PUT /api/auth ───────────────────────────────────────────────

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let Some(user) = state.users.authenticate(&req.email, &req.password) else {
        state.metrics.record_auth(false);
        return Err(AppError::Unauthorized);
    };

    let token = Uuid::new_v4().simple().to_string();
    state
        .sessions
        .lock()
        .insert(token.clone(), user.email.clone());

    state.metrics.record_auth(true);
    state.metrics.user_logged_in();
    info!(email = %user.email, "user logged in");

    Ok(Json(LoginResponse {
        name: user.name.clone(),
        email: user.email.clone(),
        token,
    }))
}

// ─── DELETE /api/auth ────────────────────────────────────────────

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let email = state
        .sessions
        .lock()
        .remove(token)
        .ok_or(AppError::Unauthorized)?;

    state.metrics.user_logged_out();
    info!(%email, "user logged out");

    Ok(Json(LogoutResponse {
        message: "logout successful".into(),
    }))
}
