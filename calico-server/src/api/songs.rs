//! Song endpoints
//!
//! GET  /api/songs           - list all songs
//! GET  /api/songs/:id       - fetch one
//! POST /api/songs/:id/vote  - increment votes
//! POST /api/songs/:id/play  - increment play count
//! GET  /api/songs/:id/cover - resolve cover art

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use calico_common::api::{ApiResponse, CoverResponse};
use calico_common::Song;
use tracing::info;

use super::extract::ExistingSong;
use crate::db::songs::{self, Counter};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/songs
pub async fn list_songs(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Song>>>> {
    let songs = songs::list_songs(&state.db)
        .await
        .map_err(|e| ApiError::internal("Failed to load songs", e))?;

    let count = songs.len();
    Ok(Json(ApiResponse::ok(songs).with_count(count)))
}

/// GET /api/songs/:id
pub async fn get_song(ExistingSong(song): ExistingSong) -> Json<ApiResponse<Song>> {
    Json(ApiResponse::ok(song))
}

/// POST /api/songs/:id/vote
pub async fn vote_song(
    State(state): State<AppState>,
    ExistingSong(song): ExistingSong,
) -> ApiResult<Json<ApiResponse<Song>>> {
    let updated = increment(&state, song.id, Counter::Votes, "Failed to register vote").await?;
    info!(song_id = updated.id, votes = updated.votes, "Vote registered");

    Ok(Json(ApiResponse::ok(updated).with_message("Vote registered")))
}

/// POST /api/songs/:id/play
pub async fn register_play(
    State(state): State<AppState>,
    ExistingSong(song): ExistingSong,
) -> ApiResult<Json<ApiResponse<Song>>> {
    let updated = increment(&state, song.id, Counter::PlayCount, "Failed to register play").await?;
    info!(song_id = updated.id, play_count = updated.play_count, "Play registered");

    Ok(Json(ApiResponse::ok(updated).with_message("Play registered")))
}

/// GET /api/songs/:id/cover
///
/// A hit is also written back to `image_url` so later listings carry it.
pub async fn get_cover(
    State(state): State<AppState>,
    ExistingSong(song): ExistingSong,
) -> ApiResult<Json<CoverResponse>> {
    let result = state
        .resolver
        .resolve(&song.artist, &song.title)
        .await
        .map_err(|e| ApiError::internal("Failed to search cover art", e))?;
    tracing::debug!(song_id = song.id, hit = result.is_hit(), "Cover lookup complete");

    if let Some(cover_url) = &result.cover_url {
        songs::set_image_url(&state.db, song.id, cover_url)
            .await
            .map_err(|e| ApiError::internal("Failed to save cover art", e))?;
    }

    Ok(Json(CoverResponse {
        success: true,
        result,
    }))
}

async fn increment(state: &AppState, id: i64, counter: Counter, failure: &str) -> ApiResult<Song> {
    songs::increment(&state.db, id, counter)
        .await
        .map_err(|e| ApiError::internal(failure, e))?
        // Row vanished between the existence check and the update
        .ok_or_else(|| ApiError::NotFound("Song not found".to_string()))
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/api/songs", get(list_songs))
        .route("/api/songs/:id", get(get_song))
        .route("/api/songs/:id/vote", post(vote_song))
        .route("/api/songs/:id/play", post(register_play))
        .route("/api/songs/:id/cover", get(get_cover))
}
