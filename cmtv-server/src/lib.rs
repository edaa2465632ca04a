//! cmtv-server library
//!
//! Serves the static site and the small JSON API around it: the playlist,
//! the live viewer counter (polling + SSE push) and the auto-update status.

use axum::Router;
use cmtv_common::PlaylistStore;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod updater;
pub mod viewers;

pub use crate::error::{ApiError, ApiResult};
pub use crate::updater::{AutoUpdateService, UpdateJob, UpdateOutcome, UpdateStatus};
pub use crate::viewers::ViewerCounter;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: PlaylistStore,
    /// Directory served for every non-API path
    pub public_dir: PathBuf,
    pub viewers: Arc<ViewerCounter>,
    pub updater: Arc<AutoUpdateService>,
}

impl AppState {
    pub fn new(
        store: PlaylistStore,
        public_dir: impl Into<PathBuf>,
        viewers: Arc<ViewerCounter>,
        updater: Arc<AutoUpdateService>,
    ) -> Self {
        Self {
            store,
            public_dir: public_dir.into(),
            viewers,
            updater,
        }
    }
}

/// Build application router
///
/// API routes first; any other path falls through to the static files.
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.public_dir);

    Router::new()
        .merge(api::health_routes())
        .merge(api::playlist_routes())
        .merge(api::viewer_routes())
        .merge(api::update_routes())
        .merge(api::event_routes())
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
