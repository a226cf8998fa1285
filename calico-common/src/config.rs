//! Configuration loading
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Steps 1 and 2 are handled by the binary's clap arguments; this module
//! owns the TOML layer and the compiled defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://calico.db?mode=rwc";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MUSICBRAINZ_URL: &str = "https://musicbrainz.org/ws/2";
pub const DEFAULT_COVER_ARCHIVE_URL: &str = "https://coverartarchive.org";
pub const DEFAULT_USER_AGENT: &str = "RadioCalico/1.0.0 (contact@radiocalico.com)";

/// Server configuration loaded from TOML
///
/// Every field has a default, so an empty or missing file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// sqlx connection string for the songs database
    pub database_url: String,
    /// Upper bound on pooled database connections
    pub max_connections: u32,
    pub bind_address: String,
    pub port: u16,
    /// Reported by `/api/status` (e.g. "development", "production")
    pub environment: String,
    /// Directory of frontend files served at `/`; not served when unset
    pub static_dir: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub cover_art: CoverArtConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            environment: "development".to_string(),
            static_dir: None,
            logging: LoggingConfig::default(),
            cover_art: CoverArtConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Outbound metadata services used by the cover art resolver
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoverArtConfig {
    /// MusicBrainz web service root (no trailing slash)
    pub musicbrainz_url: String,
    /// Cover Art Archive root (no trailing slash)
    pub cover_archive_url: String,
    pub user_agent: String,
    /// Maximum candidate releases requested from the search
    pub search_limit: u32,
    /// Whole-request timeout for every outbound call
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for CoverArtConfig {
    fn default() -> Self {
        Self {
            musicbrainz_url: DEFAULT_MUSICBRAINZ_URL.to_string(),
            cover_archive_url: DEFAULT_COVER_ARCHIVE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            search_limit: 5,
            timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

impl TomlConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit path
    ///
    /// A missing file is an error here: the caller asked for it by name.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from the explicit path or the platform default
    ///
    /// Missing default file → built-in defaults with a warning, not a failure.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            Some(path) => {
                warn!(
                    "No config file at {}, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(Error::Config("database_url must not be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(Error::Config("max_connections must be at least 1".to_string()));
        }
        if self.cover_art.search_limit == 0 {
            return Err(Error::Config("cover_art.search_limit must be at least 1".to_string()));
        }
        if self.cover_art.timeout_secs == 0 {
            return Err(Error::Config("cover_art.timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Platform config file location: `<config dir>/calico/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("calico").join("config.toml"))
}
