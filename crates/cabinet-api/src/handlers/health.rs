//! Operator endpoints.

use axum::Json;
use axum::extract::State;

use cabinet_service::status::{ServiceStatus, UsageStats};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /status
pub async fn status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(state.status_service.status().await)
}

/// GET /stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<UsageStats>, ApiError> {
    Ok(Json(state.status_service.stats().await?))
}
