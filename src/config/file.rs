//! Configuration file loading for the `marquee` CLI.
//!
//! Resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.marquee/config.toml` (user)
//! 3. `/etc/marquee/config.toml` (system)
//!
//! A missing file is not an error; defaults apply. The API key may live in
//! the file or in `TMDB_API_KEY`, which takes precedence.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::{ClientConfig, ENV_API_KEY};
use crate::{CatalogError, Result};

/// On-disk configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub tmdb: TmdbSection,
    #[serde(default)]
    pub cache: CacheSection,
}

/// `[tmdb]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbSection {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub image_base_url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Time-to-live in seconds (default: 300).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Optional cap on cached responses (default: unbounded).
    #[serde(default)]
    pub max_entries: Option<u64>,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: None,
        }
    }
}

fn default_ttl_secs() -> u64 {
    super::DEFAULT_TTL.as_secs()
}

impl FileConfig {
    /// Load from the standard locations; defaults if none exists.
    ///
    /// An explicit path that does not exist is an error.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            CatalogError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(CatalogError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".marquee").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/marquee/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Turn the file into a [`ClientConfig`], preferring `TMDB_API_KEY` over
    /// the file's key.
    pub fn into_client_config(self) -> Result<ClientConfig> {
        let env_key = std::env::var(ENV_API_KEY).ok();
        self.into_client_config_with(env_key)
    }

    fn into_client_config_with(self, env_key: Option<String>) -> Result<ClientConfig> {
        let api_key = env_key
            .filter(|k| !k.trim().is_empty())
            .or(self.tmdb.api_key)
            .ok_or_else(|| {
                CatalogError::Configuration(format!(
                    "no API key: set {ENV_API_KEY} or [tmdb].api_key in the config file"
                ))
            })?;

        let mut config =
            ClientConfig::new(api_key).default_ttl(Duration::from_secs(self.cache.ttl_secs));
        if let Some(max) = self.cache.max_entries {
            config = config.max_cache_entries(max);
        }
        if let Some(url) = self.tmdb.base_url {
            config = config.base_url(url);
        }
        if let Some(url) = self.tmdb.image_base_url {
            config = config.image_base_url(url);
        }
        if let Some(language) = self.tmdb.language {
            config = config.language(language);
        }
        if let Some(secs) = self.tmdb.timeout_secs {
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
