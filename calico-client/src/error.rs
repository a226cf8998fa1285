//! Error types for calico-client

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or undecodable response body
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with `success: false` or a non-2xx status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Media element refused to play/load
    #[error("Media error: {0}")]
    Media(String),

    /// Embedded artwork could not be fetched or read
    #[error("Artwork error: {0}")]
    Artwork(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
