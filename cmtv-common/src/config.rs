//! Configuration loading and config file resolution
//!
//! Every field has a compiled default, so a missing or partial TOML file
//! still produces a working configuration.
//!
//! Config file priority:
//! 1. Command-line argument (highest priority)
//! 2. `CMTV_CONFIG` environment variable
//! 3. `<platform config dir>/cmtv/config.toml`
//! 4. Compiled defaults (fallback)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::merge::DEFAULT_FRESHNESS_DAYS;
use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "CMTV_CONFIG";

/// Scrape sources known to the scraper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A public YouTube playlist
    Youtube,
    /// A Spotify playlist, each track resolved on YouTube
    Spotify,
    /// Wikipedia's list of Billboard number-one country songs
    Wikipedia,
    /// Billboard's Hot Country Songs chart page
    Billboard,
    /// Hand-picked video ids plus an extra YouTube playlist
    Manual,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Youtube,
        SourceKind::Spotify,
        SourceKind::Wikipedia,
        SourceKind::Billboard,
        SourceKind::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Youtube => "youtube",
            SourceKind::Spotify => "spotify",
            SourceKind::Wikipedia => "wikipedia",
            SourceKind::Billboard => "billboard",
            SourceKind::Manual => "manual",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SourceKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown source '{}'", s)))
    }
}

/// Top-level configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Playlist JSON file read by the player
    pub playlist_file: PathBuf,
    /// Directory served as the static site
    pub public_dir: PathBuf,
    /// Days a newly merged song stays flagged `isNew`
    pub freshness_days: u32,
    pub server: ServerConfig,
    pub schedule: ScheduleConfig,
    pub sources: SourcesConfig,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            playlist_file: PathBuf::from("apps/web/public/playlist.json"),
            public_dir: PathBuf::from("apps/web/public"),
            freshness_days: DEFAULT_FRESHNESS_DAYS,
            server: ServerConfig::default(),
            schedule: ScheduleConfig::default(),
            sources: SourcesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// HTTP server and viewer counter settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// A viewer counts as active while seen within this many seconds
    pub viewer_ttl_secs: u64,
    /// How often expired viewers are swept
    pub viewer_sweep_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            viewer_ttl_secs: 15,
            viewer_sweep_secs: 15,
        }
    }
}

/// Daily auto-update schedule
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScheduleConfig {
    pub enabled: bool,
    /// Local hour of the daily run (0-23)
    pub hour: u32,
    /// Local minute of the daily run (0-59)
    pub minute: u32,
    /// On startup, update immediately if the playlist is older than this
    pub stale_after_hours: u32,
    /// Sources scraped on every run, in order
    pub sources: Vec<SourceKind>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hour: 3,
            minute: 0,
            stale_after_hours: 24,
            sources: vec![SourceKind::Youtube, SourceKind::Spotify],
        }
    }
}

/// Where each scraper looks and how politely it fetches
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SourcesConfig {
    pub youtube_playlist_url: String,
    pub spotify_playlist_url: String,
    pub wikipedia_url: String,
    pub billboard_url: String,
    /// Watch-page ids added by the manual source
    pub manual_video_ids: Vec<String>,
    /// Extra playlist scraped by the manual source
    pub manual_playlist_id: Option<String>,
    /// Minimum delay between two requests
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Songs kept from the Wikipedia table
    pub wikipedia_limit: usize,
    /// Songs kept from the Billboard chart
    pub billboard_limit: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            youtube_playlist_url:
                "https://www.youtube.com/playlist?list=PLeDakahyfrO-XXf8riL8LLpO838tur7CQ".to_string(),
            spotify_playlist_url: "https://open.spotify.com/playlist/2Hi4RV1DJHHiSDcwYFFKeR".to_string(),
            wikipedia_url:
                "https://en.wikipedia.org/wiki/List_of_Billboard_number-one_country_songs_of_2025"
                    .to_string(),
            billboard_url: "https://www.billboard.com/charts/country-songs/".to_string(),
            manual_video_ids: Vec::new(),
            manual_playlist_id: None,
            request_delay_ms: 1500,
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            wikipedia_limit: 10,
            billboard_limit: 5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve the config file and load it, falling back to defaults
    ///
    /// An explicit path (CLI or environment) must exist. The platform
    /// default location is optional.
    pub fn load_resolved(cli_path: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_path) {
            ConfigLocation::Explicit(path) => {
                info!("Loading config from {}", path.display());
                Self::load(&path)
            }
            ConfigLocation::Default(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                Self::load(&path)
            }
            ConfigLocation::Default(path) => {
                warn!("No config file at {}, using built-in defaults", path.display());
                Ok(Self::default())
            }
            ConfigLocation::None => {
                warn!("No config directory on this platform, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.schedule.hour > 23 {
            return Err(Error::Config(format!(
                "schedule.hour must be 0-23, got {}",
                self.schedule.hour
            )));
        }
        if self.schedule.minute > 59 {
            return Err(Error::Config(format!(
                "schedule.minute must be 0-59, got {}",
                self.schedule.minute
            )));
        }
        if self.server.viewer_ttl_secs == 0 || self.server.viewer_sweep_secs == 0 {
            return Err(Error::Config(
                "viewer_ttl_secs and viewer_sweep_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the config file was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Named on the command line or in `CMTV_CONFIG`
    Explicit(PathBuf),
    /// Platform default location (may not exist)
    Default(PathBuf),
    /// No platform config directory
    None,
}

/// Resolve the config file location by priority
pub fn resolve_config_path(cli_path: Option<&Path>) -> ConfigLocation {
    // Priority 1: Command-line argument
    if let Some(path) = cli_path {
        return ConfigLocation::Explicit(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigLocation::Explicit(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    match dirs::config_dir() {
        Some(dir) => ConfigLocation::Default(dir.join("cmtv").join("config.toml")),
        None => ConfigLocation::None,
    }
}
