//! Service status and database connectivity endpoints

use axum::{extract::State, routing::get, Json, Router};
use calico_common::api::ApiResponse;
use serde::Serialize;

use crate::db::songs;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StatusData {
    pub status: String,
    pub environment: String,
    pub port: u16,
    pub database: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct DbTestData {
    /// Current time as reported by the database
    pub timestamp: String,
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<ApiResponse<StatusData>> {
    Json(
        ApiResponse::ok(StatusData {
            status: "Server running".to_string(),
            environment: state.info.environment.clone(),
            port: state.info.port,
            database: state.info.database.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
        .with_message("Welcome to Radio Calico"),
    )
}

/// GET /db-test
pub async fn db_test(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<DbTestData>>> {
    let timestamp = songs::ping(&state.db)
        .await
        .map_err(|e| ApiError::internal("Database connection failed", e))?;

    Ok(Json(
        ApiResponse::ok(DbTestData { timestamp }).with_message("Database connection OK"),
    ))
}

/// Build status routes
pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/db-test", get(db_test))
}
