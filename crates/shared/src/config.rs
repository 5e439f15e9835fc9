//! Configuration management for the anime browser.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Database settings
    pub database: DatabaseConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Catalogue API settings
    pub catalog: CatalogConfig,

    /// List browsing settings
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path (relative to data directory or absolute)
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Where filtering happens
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Fetch the whole catalogue once and filter in memory
    #[default]
    Client,
    /// Delegate filtering to the filtered listing endpoint
    Server,
}

/// Catalogue API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// API base URL
    pub base_url: String,

    /// Filtering strategy
    #[serde(default)]
    pub strategy: Strategy,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Number of records requested when fetching the whole catalogue
    pub catalog_limit: u32,

    /// Cache settings
    pub cache: CacheConfig,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable caching
    pub enabled: bool,

    /// Cache directory (relative to data directory)
    pub cache_dir: String,

    /// Cache expiration in seconds (None = permanent)
    pub expiration_seconds: Option<u64>,
}

/// List browsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Anime shown per page
    pub page_size: u32,

    /// Delay before a search keystroke is committed to the URL
    pub search_debounce_ms: u64,

    /// Lowest selectable air year
    pub min_year: i32,

    /// Highest selectable air year (None = current year)
    pub max_year: Option<i32>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            page_size: 30,
            search_debounce_ms: 500,
            min_year: 1965,
            max_year: None,
        }
    }
}

impl BrowserConfig {
    /// Inclusive bounds of the year slider
    pub fn year_bounds(&self) -> (i32, i32) {
        let max = self
            .max_year
            .unwrap_or_else(|| chrono::Utc::now().year());
        (self.min_year, max.max(self.min_year))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "data".to_string(),
            },
            database: DatabaseConfig {
                path: "lists.db".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: true,
                json_format: false,
            },
            catalog: CatalogConfig {
                base_url: "http://localhost:8000".to_string(),
                strategy: Strategy::Client,
                timeout_seconds: 30,
                catalog_limit: 10_000,
                cache: CacheConfig {
                    enabled: true,
                    cache_dir: "cache".to_string(),
                    expiration_seconds: Some(3600),
                },
            },
            browser: BrowserConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Parse the configured default log level
    pub fn log_level(&self) -> tracing::Level {
        self.logging
            .default_level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }

    /// Get the path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the path for the database file
    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.database.path)
    }

    /// Get the path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    /// Get the path for the cache directory
    pub fn cache_dir(&self) -> PathBuf {
        self.resolve(&self.catalog.cache.cache_dir)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}
