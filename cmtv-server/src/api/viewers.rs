//! Viewer counter endpoint
//!
//! Players poll with GET and send heartbeats with POST; both refresh the
//! caller's last-seen time.

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use cmtv_common::time;
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::cors::CorsLayer;

use crate::viewers::viewer_id;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerCountResponse {
    /// Active viewers
    pub count: usize,
    pub timestamp: String,
    pub source: &'static str,
    /// Tracked viewers, including ones awaiting the sweep
    pub viewers: usize,
    pub active: usize,
    pub viewer_id: String,
}

/// GET /api/viewer-count
pub async fn get_viewer_count(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Json<ViewerCountResponse> {
    let id = viewer_id(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let now = Instant::now();
    state.viewers.touch(&id, now);

    let active = state.viewers.active_count(now);
    let total = state.viewers.total();
    tracing::debug!(active, total, "Viewer count");

    Json(ViewerCountResponse {
        count: active,
        timestamp: time::to_iso_string(time::now()),
        source: "real-count",
        viewers: total,
        active,
        viewer_id: id,
    })
}

/// POST /api/viewer-count
pub async fn post_viewer_heartbeat(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let id = viewer_id(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    state.viewers.touch(&id, Instant::now());
    Json(json!({ "status": "heartbeat received" }))
}

/// Any other method on /api/viewer-count
pub async fn viewer_method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

pub fn viewer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/viewer-count",
            get(get_viewer_count)
                .post(post_viewer_heartbeat)
                .fallback(viewer_method_not_allowed),
        )
        .layer(CorsLayer::permissive())
}
