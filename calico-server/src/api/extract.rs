//! Song existence precondition
//!
//! Every song-scoped endpoint takes [`ExistingSong`] instead of repeating the
//! id validation and lookup: a non-numeric id is rejected with 400, an
//! unknown id with 404, before the handler body runs.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use calico_common::Song;

use crate::db::songs;
use crate::error::ApiError;
use crate::AppState;

/// The song named by the `:id` path segment, known to exist
#[derive(Debug, Clone)]
pub struct ExistingSong(pub Song);

/// Parse a path id as a song id
pub fn parse_song_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest("Invalid song id".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for ExistingSong {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::BadRequest("Invalid song id".to_string()))?;

        let id = parse_song_id(&raw_id)?;

        match songs::get_song(&state.db, id).await {
            Ok(Some(song)) => Ok(ExistingSong(song)),
            Ok(None) => {
                tracing::debug!(song_id = id, "Song not found");
                Err(ApiError::NotFound("Song not found".to_string()))
            }
            Err(e) => Err(ApiError::internal("Failed to validate song", e)),
        }
    }
}
