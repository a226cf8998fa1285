//! Common error types for Radio Calico

use thiserror::Error;

/// Common result type for Calico operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by server and client
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
