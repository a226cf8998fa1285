//! Song model and cover art search result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker substring identifying a placeholder image that still needs cover art
pub const PLACEHOLDER_MARKER: &str = "placeholder";

/// Image shown when a song has no cover art
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder-1.svg";

/// A row of the `songs` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Primary key, immutable
    pub id: i64,
    pub title: String,
    pub artist: String,
    /// Playable media URI. Songs without one are informational only.
    pub audio_file: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub spotify_url: Option<String>,
    pub youtube_url: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<String>,
    /// Increment-only
    pub votes: i64,
    /// Increment-only
    pub play_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Song {
    /// True when `image_url` is missing or still points at a placeholder
    pub fn needs_cover_art(&self) -> bool {
        match self.image_url.as_deref() {
            None => true,
            Some(url) => url.trim().is_empty() || url.contains(PLACEHOLDER_MARKER),
        }
    }

    /// True when the song has something to play
    pub fn is_playable(&self) -> bool {
        self.audio_file
            .as_deref()
            .map(|f| !f.trim().is_empty())
            .unwrap_or(false)
    }

    /// Image to display, falling back to the placeholder
    pub fn display_image(&self) -> &str {
        self.image_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE)
    }
}

/// Parameters for creating a song out of band (tooling, seeding, tests)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub audio_file: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub spotify_url: Option<String>,
    pub youtube_url: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<String>,
    /// Explicit creation time; the database default is used when absent
    pub created_at: Option<DateTime<Utc>>,
}

impl NewSong {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            ..Default::default()
        }
    }
}

/// Where a cover image was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverSource {
    /// Hit in the Cover Art Archive
    #[serde(rename = "coverartarchive")]
    CoverArtArchive,
    /// No provider had artwork
    None,
}

/// Result of one cover art resolution. Not persisted by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverSearchResult {
    pub cover_url: Option<String>,
    pub source: CoverSource,
    /// Title of the matched release
    pub release: Option<String>,
}

impl CoverSearchResult {
    pub fn none() -> Self {
        Self {
            cover_url: None,
            source: CoverSource::None,
            release: None,
        }
    }

    pub fn archive_hit(cover_url: String, release: Option<String>) -> Self {
        Self {
            cover_url: Some(cover_url),
            source: CoverSource::CoverArtArchive,
            release,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.cover_url.is_some()
    }
}
