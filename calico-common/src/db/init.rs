//! Database initialization
//!
//! Opens (creating when missing) the songs database and makes sure the
//! schema exists. Safe to run on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Connect a pool to `database_url` and create tables if needed
pub async fn init_database_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    debug!("Connecting to database: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        // WAL allows concurrent readers alongside the single writer
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    init_tables(&pool).await?;

    info!(max_connections, "Database pool ready");
    Ok(pool)
}

/// Single-connection in-memory database with the schema applied
///
/// Each SQLite in-memory connection is its own database, so the pool is
/// pinned to one connection that never expires.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    init_tables(&pool).await?;
    Ok(pool)
}

/// Create the songs table (idempotent)
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            artist TEXT NOT NULL,
            audio_file TEXT,
            image_url TEXT,
            description TEXT,
            spotify_url TEXT,
            youtube_url TEXT,
            genre TEXT,
            duration TEXT,
            votes INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0),
            play_count INTEGER NOT NULL DEFAULT 0 CHECK (play_count >= 0),
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_songs_ranking ON songs (play_count DESC, created_at DESC)",
    )
    .execute(pool)
    .await?;

    debug!("Database tables initialized (songs)");
    Ok(())
}
