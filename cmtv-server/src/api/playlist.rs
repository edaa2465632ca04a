//! Playlist endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use cmtv_common::shuffle::{playable_songs, shuffle_songs};
use cmtv_common::Playlist;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PlaylistQuery {
    /// Return only playable songs, in random order
    #[serde(default)]
    pub shuffle: bool,
}

/// GET /api/playlist
pub async fn get_playlist(
    State(state): State<AppState>,
    Query(query): Query<PlaylistQuery>,
) -> ApiResult<Json<Playlist>> {
    let playlist = state
        .store
        .load_strict()?
        .ok_or_else(|| ApiError::NotFound("No playlist has been generated yet".to_string()))?;

    if !query.shuffle {
        return Ok(Json(playlist));
    }

    let songs = shuffle_songs(&playable_songs(&playlist), &mut rand::thread_rng());
    Ok(Json(Playlist { songs, ..playlist }))
}

pub fn playlist_routes() -> Router<AppState> {
    Router::new().route("/api/playlist", get(get_playlist))
}
