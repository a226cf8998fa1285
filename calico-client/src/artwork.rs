//! Embedded cover art
//!
//! Audio files often carry a picture in their tags (ID3 `APIC`, FLAC
//! `PICTURE`, MP4 `covr`). Once a track starts, the playback controller asks
//! an [`ArtworkExtractor`] for it and, when one is found, shows it as the
//! now-playing image in place of the catalog image.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use lofty::{PictureType, TaggedFileExt};

use crate::api::ClientConfig;
use crate::error::{ClientError, Result};

/// Pictures larger than this are ignored (5 MB)
pub const MAX_ARTWORK_SIZE: usize = 5 * 1024 * 1024;

const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Picture found in an audio file's tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedArtwork {
    pub data: Vec<u8>,
    /// e.g. "image/jpeg", "image/png"
    pub mime_type: String,
}

impl EmbeddedArtwork {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// `data:` URL usable wherever an image URL is expected
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

/// Reads the embedded picture of a song's audio file
#[async_trait]
pub trait ArtworkExtractor: Send + Sync {
    /// `Ok(None)` when the file has no picture
    async fn extract(&self, audio_file: &str) -> Result<Option<EmbeddedArtwork>>;
}

/// Downloads the audio file from the server and reads its tags
pub struct HttpArtworkExtractor {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpArtworkExtractor {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.to_string(),
        })
    }

    /// Absolute URL of an `audio_file` value (absolute or server-relative)
    fn audio_url(&self, audio_file: &str) -> String {
        if audio_file.starts_with("http://") || audio_file.starts_with("https://") {
            audio_file.to_string()
        } else {
            format!("{}/{}", self.base_url, audio_file.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl ArtworkExtractor for HttpArtworkExtractor {
    async fn extract(&self, audio_file: &str) -> Result<Option<EmbeddedArtwork>> {
        let url = self.audio_url(audio_file);
        let response = self.http_client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Artwork(format!(
                "Fetching {} returned {}",
                url,
                status.as_u16()
            )));
        }

        let bytes = response.bytes().await?.to_vec();
        tracing::debug!(url = %url, size = bytes.len(), "Audio fetched for artwork");

        tokio::task::spawn_blocking(move || read_embedded_artwork(&bytes))
            .await
            .map_err(|e| ClientError::Artwork(e.to_string()))?
    }
}

/// Pull the front cover (or else the first picture) out of an audio file
pub fn read_embedded_artwork(audio: &[u8]) -> Result<Option<EmbeddedArtwork>> {
    let tagged_file = lofty::Probe::new(Cursor::new(audio))
        .guess_file_type()
        .map_err(|e| ClientError::Artwork(e.to_string()))?
        .read()
        .map_err(|e| ClientError::Artwork(e.to_string()))?;

    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        return Ok(None);
    };

    let pictures = tag.pictures();
    let Some(picture) = pictures
        .iter()
        .find(|p| matches!(p.pic_type(), PictureType::CoverFront))
        .or_else(|| pictures.first())
    else {
        return Ok(None);
    };

    let data = picture.data();
    if data.len() > MAX_ARTWORK_SIZE {
        return Err(ClientError::Artwork(format!(
            "Embedded picture too large ({} bytes, max {})",
            data.len(),
            MAX_ARTWORK_SIZE
        )));
    }

    let mime_type = picture
        .mime_type()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

    Ok(Some(EmbeddedArtwork::new(data.to_vec(), mime_type)))
}
