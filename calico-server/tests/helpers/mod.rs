//! Shared fixtures for calico-server integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use calico_common::config::CoverArtConfig;
use calico_common::{NewSong, Song};
use calico_server::db::songs;
use calico_server::services::CoverArtResolver;
use calico_server::{build_router, AppState, ServerInfo};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

/// In-memory database with the schema applied
pub async fn test_pool() -> SqlitePool {
    calico_common::db::init_memory_pool()
        .await
        .expect("Failed to create in-memory database")
}

/// Resolver pointed at a mock server (or an unroutable default)
pub fn test_resolver(base_url: &str) -> CoverArtResolver {
    let config = CoverArtConfig {
        musicbrainz_url: format!("{}/ws/2", base_url),
        cover_archive_url: base_url.to_string(),
        timeout_secs: 2,
        connect_timeout_secs: 1,
        ..Default::default()
    };
    CoverArtResolver::new(&config).expect("Failed to build resolver")
}

pub fn test_app(pool: SqlitePool, upstream_url: &str) -> Router {
    let state = AppState::new(
        pool,
        test_resolver(upstream_url),
        ServerInfo {
            environment: "test".to_string(),
            port: 3000,
            database: "memory".to_string(),
        },
    );
    build_router(state)
}

pub async fn seed_song(pool: &SqlitePool, title: &str, artist: &str) -> Song {
    let mut song = NewSong::new(title, artist);
    song.audio_file = Some(format!("/audio/{}.mp3", title.to_lowercase().replace(' ', "-")));
    songs::insert_song(pool, &song).await.expect("Failed to seed song")
}

pub async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
