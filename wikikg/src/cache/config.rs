//! Configuration for the file-backed cache

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for `FileBackedCacheStore`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache file; `None` keeps the cache purely in memory
    pub path: Option<PathBuf>,

    /// Upper bound on waiting for the cross-process lock during synchronize
    pub lock_timeout: Duration,

    /// Delay between lock acquisition attempts
    pub lock_poll_interval: Duration,

    /// Write indented JSON
    pub pretty: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            lock_timeout: Duration::from_secs(30),
            lock_poll_interval: Duration::from_millis(50),
            pretty: false,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Read `WIKIKG_CACHE_PATH` and `WIKIKG_LOCK_TIMEOUT_SECS`, honoring a `.env` file
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let defaults = Self::default();
        let path = std::env::var("WIKIKG_CACHE_PATH").ok().map(PathBuf::from);
        let lock_timeout = std::env::var("WIKIKG_LOCK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.lock_timeout);

        Self {
            path,
            lock_timeout,
            ..defaults
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.lock_poll_interval.is_zero() {
            return Err("lock_poll_interval must be greater than 0".to_string());
        }

        if self.lock_poll_interval > self.lock_timeout && !self.lock_timeout.is_zero() {
            return Err("lock_poll_interval must not exceed lock_timeout".to_string());
        }

        Ok(())
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    path: Option<PathBuf>,
    lock_timeout: Option<Duration>,
    lock_poll_interval: Option<Duration>,
    pretty: Option<bool>,
}

impl CacheConfigBuilder {
    /// Set the cache file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the lock acquisition bound
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Set the delay between lock attempts
    pub fn lock_poll_interval(mut self, interval: Duration) -> Self {
        self.lock_poll_interval = Some(interval);
        self
    }

    /// Enable or disable indented output
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = Some(pretty);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            path: self.path.or(defaults.path),
            lock_timeout: self.lock_timeout.unwrap_or(defaults.lock_timeout),
            lock_poll_interval: self
                .lock_poll_interval
                .unwrap_or(defaults.lock_poll_interval),
            pretty: self.pretty.unwrap_or(defaults.pretty),
        }
    }
}
