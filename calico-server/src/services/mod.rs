//! Outbound integrations

pub mod cover_art;

pub use cover_art::{CoverArtResolver, ResolverError};
