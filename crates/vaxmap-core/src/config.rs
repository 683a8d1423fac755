//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the API base URL, paging, the store freshness threshold and the slow
//! network switch used for manual testing.
//!
//! Configuration is stored at `~/.config/vaxmap/config.json`. The API
//! service key is deliberately not part of it; it comes from the
//! `CENTERS_API_KEY` environment variable.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_BASE_URL;
use crate::refresh::orchestrator::{DEFAULT_PAGE_COUNT, DEFAULT_PER_PAGE};
use crate::refresh::RefreshOptions;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "vaxmap";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Store file name inside the cache directory
const STORE_FILE: &str = "centers.json";

/// Environment variable holding the API service key
pub const API_KEY_ENV: &str = "CENTERS_API_KEY";

/// Below this many stored centers the cache is considered cold.
/// Covers both a first launch and a refresh that was cut off halfway.
const DEFAULT_FRESH_THRESHOLD: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub page_count: u32,
    pub per_page: u32,
    pub fresh_threshold: usize,
    pub slow_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_count: DEFAULT_PAGE_COUNT,
            per_page: DEFAULT_PER_PAGE,
            fresh_threshold: DEFAULT_FRESH_THRESHOLD,
            slow_mode: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Ok(serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn store_path(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join(STORE_FILE))
    }

    /// Service key from the environment, or `None` if unset or empty.
    pub fn api_key() -> Option<String> {
        std::env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty())
    }

    /// Whether a store holding `count` centers needs a remote refresh.
    pub fn needs_refresh(&self, count: usize) -> bool {
        count < self.fresh_threshold
    }

    /// Refresh options for a store currently holding `count` centers.
    pub fn refresh_options(&self, count: usize) -> RefreshOptions {
        RefreshOptions {
            skip_remote_fetch: !self.needs_refresh(count),
            slow_mode: self.slow_mode,
        }
    }
}
