//! Application configuration
//!
//! Settings come from the environment (a `.env` file is honoured) and fall
//! back to defaults that point at the public iTunes catalog.

use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::errors::ConfigError;

pub const DEFAULT_SEARCH_URL: &str = "https://itunes.apple.com/search";
pub const DEFAULT_DATA_DIR: &str = ".cache";
pub const DEFAULT_INITIAL_QUERY: &str = "Drake";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 8000;

const ENV_SEARCH_URL: &str = "MUSIC_FINDER_SEARCH_URL";
const ENV_DATA_DIR: &str = "MUSIC_FINDER_DATA_DIR";
const ENV_INITIAL_QUERY: &str = "MUSIC_FINDER_INITIAL_QUERY";
const ENV_HTTP_TIMEOUT_MS: &str = "MUSIC_FINDER_HTTP_TIMEOUT_MS";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub search_url: Url,
    pub data_dir: PathBuf,
    /// Search issued once at startup; `None` skips it
    pub initial_query: Option<String>,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            // Constant is a valid absolute URL
            search_url: Url::parse(DEFAULT_SEARCH_URL).unwrap(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            initial_query: Some(DEFAULT_INITIAL_QUERY.to_string()),
            http_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_SEARCH_URL).filter(|v| !v.trim().is_empty()) {
            config.search_url = parse_search_url(raw.trim())?;
        }

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(query) = lookup(ENV_INITIAL_QUERY) {
            let query = query.trim();
            config.initial_query = (!query.is_empty()).then(|| query.to_string());
        }

        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: ENV_HTTP_TIMEOUT_MS,
                reason: format!("not a number of milliseconds: {raw}"),
            })?;
            config.http_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }
}

fn parse_search_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name: ENV_SEARCH_URL,
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            name: ENV_SEARCH_URL,
            reason: format!("unsupported scheme {other}"),
        }),
    }
}
