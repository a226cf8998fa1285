//! # Calico Common Library
//!
//! Shared code for the Radio Calico server and client:
//! - Song model and cover search result types
//! - API response envelope
//! - Database pool and schema initialization
//! - Configuration loading

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{CoverSearchResult, CoverSource, NewSong, Song};
