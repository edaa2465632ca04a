//! Auto-update status and manual trigger

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::error::{ApiError, ApiResult};
use crate::updater::{UpdateOutcome, UpdateStatus};
use crate::AppState;

/// GET /api/update/status
pub async fn get_update_status(State(state): State<AppState>) -> Json<UpdateStatus> {
    Json(state.updater.status())
}

/// POST /api/update/trigger
///
/// Runs a full update cycle before answering.
pub async fn trigger_update(State(state): State<AppState>) -> ApiResult<Json<UpdateOutcome>> {
    if state.updater.is_running() {
        return Err(ApiError::Conflict("An update is already running".to_string()));
    }

    tracing::info!("Manual update triggered");
    match state.updater.trigger().await {
        UpdateOutcome::Skipped => Err(ApiError::Conflict("An update is already running".to_string())),
        outcome => Ok(Json(outcome)),
    }
}

pub fn update_routes() -> Router<AppState> {
    Router::new()
        .route("/api/update/status", get(get_update_status))
        .route("/api/update/trigger", post(trigger_update))
}
