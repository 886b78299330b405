use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gerrit: GerritConfig,
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
}

/// Remote Gerrit instance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GerritConfig {
    /// Hostname of the Gerrit instance
    pub host: String,
    /// SSH user for the command channel
    pub user: String,
    /// SSH port (Gerrit's default is 29418)
    pub port: u16,
}

impl Default for GerritConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            user: String::new(),
            port: 29418,
        }
    }
}

/// Review retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Reviews requested per query page
    pub page_size: usize,
    /// Hard cap on total in-memory reviews across all projects.
    /// 50 * 1000 keeps worst-case resident memory to a few gigabytes.
    pub max_reviews: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: 500,
            max_reviews: 1000 * 50,
        }
    }
}

/// Disk cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Base directory for cache artifacts
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: ".gerrit-harvest/cache".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Load configuration from the default location (.gerrit-harvest/config.yml)
    pub fn load_default() -> Result<Self> {
        Self::load(".gerrit-harvest/config.yml")
    }
}
