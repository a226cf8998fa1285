//! Typed client for the Radio Calico HTTP API

use std::time::Duration;

use async_trait::async_trait;
use calico_common::api::{ApiResponse, CoverResponse};
use calico_common::{CoverSearchResult, Song};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ClientError, Result};

/// Where and how to reach the server
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:3000`
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: format!("http://localhost:{}", calico_common::config::DEFAULT_PORT),
            timeout_secs: 10,
        }
    }
}

/// Song operations the catalog needs from the server
#[async_trait]
pub trait SongApi: Send + Sync {
    async fn list_songs(&self) -> Result<Vec<Song>>;

    /// Returns the song with its updated vote count
    async fn vote(&self, song_id: i64) -> Result<Song>;

    /// Returns the song with its updated play count
    async fn register_play(&self, song_id: i64) -> Result<Song>;

    async fn fetch_cover(&self, song_id: i64) -> Result<CoverSearchResult>;
}

/// reqwest implementation of [`SongApi`]
pub struct RadioApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl RadioApiClient {
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

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_song(&self, song_id: i64, action: &str) -> Result<Song> {
        let response = self
            .http_client
            .post(self.url(&format!("/api/songs/{}/{}", song_id, action)))
            .send()
            .await?;
        read_data(response).await
    }
}

/// Turn a non-2xx response into [`ClientError::Api`], using the envelope
/// message when the body has one
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ApiResponse<serde_json::Value>>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| default_message(status));

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>> {
    let response = check_status(response).await?;
    let status = response.status();
    let body: ApiResponse<T> = response.json().await?;

    if !body.success {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: body.message.unwrap_or_else(|| default_message(status)),
        });
    }
    Ok(body)
}

async fn read_data<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status().as_u16();
    read_envelope(response)
        .await?
        .data
        .ok_or_else(|| ClientError::Api {
            status,
            message: "Response carried no data".to_string(),
        })
}

#[async_trait]
impl SongApi for RadioApiClient {
    async fn list_songs(&self) -> Result<Vec<Song>> {
        let response = self.http_client.get(self.url("/api/songs")).send().await?;
        let envelope: ApiResponse<Vec<Song>> = read_envelope(response).await?;
        let songs = envelope.data.unwrap_or_default();

        tracing::debug!(count = songs.len(), "Loaded songs");
        Ok(songs)
    }

    async fn vote(&self, song_id: i64) -> Result<Song> {
        self.post_song(song_id, "vote").await
    }

    async fn register_play(&self, song_id: i64) -> Result<Song> {
        self.post_song(song_id, "play").await
    }

    async fn fetch_cover(&self, song_id: i64) -> Result<CoverSearchResult> {
        let response = self
            .http_client
            .get(self.url(&format!("/api/songs/{}/cover", song_id)))
            .send()
            .await?;
        let response = check_status(response).await?;
        let status = response.status().as_u16();
        let body: CoverResponse = response.json().await?;

        if !body.success {
            return Err(ClientError::Api {
                status,
                message: "Cover lookup failed".to_string(),
            });
        }
        Ok(body.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_local_server() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let config = ClientConfig {
            base_url: "ftp://radio.example".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            RadioApiClient::new(&config),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig {
            base_url: "http://radio.example/".to_string(),
            ..Default::default()
        };
        let client = RadioApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://radio.example");
        assert_eq!(client.url("/api/songs"), "http://radio.example/api/songs");
    }
}
