//! Cover art resolution via MusicBrainz + Cover Art Archive
//!
//! Searches MusicBrainz for candidate releases matching an artist/title pair,
//! then asks the Cover Art Archive about each candidate in order. The first
//! release with a front cover wins. The scan is linear and short-circuiting:
//! no caching, no parallel fan-out, no retry.

use calico_common::config::CoverArtConfig;
use calico_common::CoverSearchResult;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Cover art resolver errors
///
/// Only the metadata search can fail the resolution; individual archive
/// lookups that fail just move on to the next candidate.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("MusicBrainz API error: {0}")]
    ApiError(u16),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// MusicBrainz release search response
#[derive(Debug, Clone, Deserialize)]
pub struct MBReleaseSearch {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub releases: Vec<MBRelease>,
}

/// MusicBrainz release (one search candidate)
#[derive(Debug, Clone, Deserialize)]
pub struct MBRelease {
    /// Release MBID (MusicBrainz ID)
    pub id: String,
    /// Release title; some search hits omit it
    #[serde(default)]
    pub title: Option<String>,
    /// Release date in YYYY-MM-DD format
    pub date: Option<String>,
    pub country: Option<String>,
}

/// Resolves cover art for songs
///
/// Stateless apart from its HTTP client; construct once per process and
/// share behind an `Arc`.
pub struct CoverArtResolver {
    http_client: reqwest::Client,
    musicbrainz_url: String,
    cover_archive_url: String,
    search_limit: u32,
}

impl CoverArtResolver {
    pub fn new(config: &CoverArtConfig) -> Result<Self, ResolverError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ResolverError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            musicbrainz_url: config.musicbrainz_url.trim_end_matches('/').to_string(),
            cover_archive_url: config.cover_archive_url.trim_end_matches('/').to_string(),
            search_limit: config.search_limit,
        })
    }

    /// Find a front cover for `artist` / `title`
    pub async fn resolve(&self, artist: &str, title: &str) -> Result<CoverSearchResult, ResolverError> {
        let candidates = self.search_releases(artist, title).await?;

        if candidates.is_empty() {
            tracing::debug!(artist, title, "No candidate releases");
            return Ok(CoverSearchResult::none());
        }

        for release in candidates {
            if let Some(cover_url) = self.check_front_cover(&release.id).await {
                tracing::info!(
                    artist,
                    title,
                    release = release.title.as_deref().unwrap_or_default(),
                    release_id = %release.id,
                    "Cover art found in Cover Art Archive"
                );
                return Ok(CoverSearchResult::archive_hit(cover_url, release.title));
            }
        }

        tracing::debug!(artist, title, "No candidate release has cover art");
        Ok(CoverSearchResult::none())
    }

    /// Query MusicBrainz for candidate releases, in relevance order
    pub async fn search_releases(&self, artist: &str, title: &str) -> Result<Vec<MBRelease>, ResolverError> {
        let url = format!("{}/release/", self.musicbrainz_url);
        let query = search_query(artist, title);
        let limit = self.search_limit.to_string();

        tracing::debug!(query = %query, url = %url, "Querying MusicBrainz API");

        let response = self
            .http_client
            .get(&url)
            .query(&[("query", query.as_str()), ("fmt", "json"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| ResolverError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::ApiError(status.as_u16()));
        }

        let search: MBReleaseSearch = response
            .json()
            .await
            .map_err(|e| ResolverError::ParseError(e.to_string()))?;

        tracing::debug!(
            total = search.count,
            returned = search.releases.len(),
            "MusicBrainz search complete"
        );

        Ok(search.releases)
    }

    /// Cover Art Archive URL of a release's 500px front cover
    pub fn front_cover_url(&self, release_id: &str) -> String {
        format!("{}/release/{}/front-500", self.cover_archive_url, release_id)
    }

    /// HEAD the front cover; `Some(url)` when the archive has it
    async fn check_front_cover(&self, release_id: &str) -> Option<String> {
        let url = self.front_cover_url(release_id);

        match self.http_client.head(&url).send().await {
            Ok(response) if response.status().is_success() => Some(url),
            Ok(response) => {
                tracing::debug!(release_id, status = response.status().as_u16(), "No front cover");
                None
            }
            Err(e) => {
                tracing::debug!(release_id, error = %e, "Cover check failed");
                None
            }
        }
    }
}

/// Lucene query matching releases that contain the recording
fn search_query(artist: &str, title: &str) -> String {
    format!("artist:{} AND recording:{}", artist.trim(), title.trim())
}
