//! calico-server library - Radio Calico song API
//!
//! Exposes the router and state for the binary and integration tests.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};
use crate::services::CoverArtResolver;

/// Values reported by `/api/status`
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub environment: String,
    /// Externally visible port
    pub port: u16,
    /// Database name shown to operators (never the full connection string)
    pub database: String,
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Cover art resolver, constructed once per process
    pub resolver: Arc<CoverArtResolver>,
    pub info: Arc<ServerInfo>,
    /// Frontend directory served at `/`
    pub static_dir: Option<PathBuf>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, resolver: CoverArtResolver, info: ServerInfo) -> Self {
        Self {
            db,
            resolver: Arc::new(resolver),
            info: Arc::new(info),
            static_dir: None,
            startup_time: Utc::now(),
        }
    }

    pub fn with_static_dir(mut self, static_dir: Option<PathBuf>) -> Self {
        self.static_dir = static_dir;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.static_dir.clone();

    let router = Router::new()
        .merge(api::song_routes())
        .merge(api::status_routes())
        .merge(api::health_routes())
        .with_state(state);

    // Static frontend last so API routes always win
    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}
