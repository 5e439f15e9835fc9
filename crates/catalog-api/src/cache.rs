//! Cache management for catalogue responses.
//!
//! Validated responses are stored as JSON files. Entries older than the
//! configured expiration are treated as misses and refreshed on next fetch.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

/// Cache manager for API responses
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Root cache directory
    cache_dir: PathBuf,
    /// Whether caching is enabled
    enabled: bool,
    /// Maximum entry age (None = permanent)
    expiration: Option<Duration>,
}

impl CacheManager {
    /// Create a new cache manager
    pub fn new(
        cache_dir: impl AsRef<Path>,
        enabled: bool,
        expiration_seconds: Option<u64>,
    ) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();

        if enabled {
            std::fs::create_dir_all(&cache_dir).with_context(|| {
                format!("Failed to create cache directory: {}", cache_dir.display())
            })?;
            info!(
                cache_dir = %cache_dir.display(),
                expiration_seconds = ?expiration_seconds,
                "Cache initialized"
            );
        }

        Ok(Self {
            cache_dir,
            enabled,
            expiration: expiration_seconds.map(Duration::from_secs),
        })
    }

    /// Create a cache manager from the workspace configuration
    pub fn from_config(config: &shared::Config) -> Result<Self> {
        let cache = &config.catalog.cache;
        Self::new(config.cache_dir(), cache.enabled, cache.expiration_seconds)
    }

    /// Get a cached item if it exists and has not expired
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        if !self.enabled {
            return Ok(None);
        }

        let path = self.cache_path(key);
        if !path.exists() {
            debug!(key = key, "Cache miss");
            return Ok(None);
        }

        if self.is_expired(&path)? {
            debug!(key = key, "Cache entry expired");
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;

        let data: T = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse cache file: {}", path.display()))?;

        debug!(key = key, "Cache hit");
        Ok(Some(data))
    }

    /// Store an item in the cache
    pub fn set<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let path = self.cache_path(key);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache subdirectory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string(data).context("Failed to serialize cache data")?;

        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write cache file: {}", path.display()))?;

        debug!(key = key, path = %path.display(), "Cache stored");
        Ok(())
    }

    /// Check if a fresh cache entry exists
    pub fn exists(&self, key: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let path = self.cache_path(key);
        path.exists() && matches!(self.is_expired(&path), Ok(false))
    }

    fn is_expired(&self, path: &Path) -> Result<bool> {
        let Some(expiration) = self.expiration else {
            return Ok(false);
        };

        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to read cache file metadata: {}", path.display()))?;

        // A timestamp in the future counts as fresh
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);

        Ok(age > expiration)
    }

    /// Get the cache file path for a given key
    fn cache_path(&self, key: &str) -> PathBuf {
        // Sanitize key to create valid filename
        let safe_key = key
            .replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
            .replace("__", "_");

        self.cache_dir.join(format!("{}.json", safe_key))
    }

    /// Clear all cache
    pub fn clear(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.cache_dir.exists() {
            std::fs::remove_dir_all(&self.cache_dir).with_context(|| {
                format!("Failed to remove cache directory: {}", self.cache_dir.display())
            })?;
            std::fs::create_dir_all(&self.cache_dir).with_context(|| {
                format!("Failed to recreate cache directory: {}", self.cache_dir.display())
            })?;
            info!("Cache cleared");
        }

        Ok(())
    }

    /// Get cache statistics
    pub fn stats(&self) -> Result<CacheStats> {
        if !self.enabled || !self.cache_dir.exists() {
            return Ok(CacheStats::default());
        }

        let mut stats = CacheStats::default();

        for entry in std::fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                stats.total_files += 1;
                stats.total_size_bytes += entry.metadata()?.len();
                if self.is_expired(&path)? {
                    stats.expired_files += 1;
                }
            }
        }

        Ok(stats)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_files: usize,
    pub expired_files: usize,
    pub total_size_bytes: u64,
}
