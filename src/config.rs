use crate::constants::{DEFAULT_CONFIG_PATH, TMDB_API_KEY_ENV, TMDB_BASE_URL};
use crate::error::{InsightsError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tmdb: TmdbConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub base_url: String,
    pub language: String,
    pub original_language: String,
    /// Pause between consecutive result pages
    pub page_delay_ms: u64,
    /// Pause before retrying a 429 response
    pub rate_limit_backoff_ms: u64,
    pub max_rate_limit_retries: u32,
    pub timeout_seconds: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: TMDB_BASE_URL.to_string(),
            language: "en-US".to_string(),
            original_language: "en".to_string(),
            page_delay_ms: 100,
            rate_limit_backoff_ms: 1000,
            max_rate_limit_retries: 60,
            timeout_seconds: 30,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `movie_insights.toml` when no
    /// path is given. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, explicit) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        if !explicit && !config_path.exists() {
            debug!("No {} found, using default configuration", DEFAULT_CONFIG_PATH);
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path).map_err(|e| {
            InsightsError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// Read the TMDB credential from the process environment.
pub fn api_key_from_env() -> Result<String> {
    require_api_key(std::env::var(TMDB_API_KEY_ENV).ok())
}

/// A missing or blank credential is a configuration error.
pub fn require_api_key(value: Option<String>) -> Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(InsightsError::Config(format!(
            "Missing {} in environment. Please set it in a `.env` file.",
            TMDB_API_KEY_ENV
        ))),
    }
}
