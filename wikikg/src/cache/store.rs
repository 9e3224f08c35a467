//! File-backed cache store
//!
//! Wraps a `KeyedCache` with a designated JSON file. The file is a projection
//! of the in-memory state: it is read when the store opens and during
//! `synchronize`, and written on explicit saves.

use crate::cache::{
    config::CacheConfig,
    keyed::KeyedCache,
    lock::FileLockGuard,
    types::{CacheKey, CacheMap, CacheStats, CacheTag, CacheValue},
};
use crate::error::{Result, WikiError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of a `synchronize` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// File that was reconciled
    pub path: PathBuf,

    /// Entries read from the file and merged into memory
    pub merged_entries: usize,

    /// Entries written back to the file
    pub written_entries: usize,

    /// When the write completed
    pub synced_at: DateTime<Utc>,
}

/// Cache persisted to a JSON file shaped `tag -> (key -> value)`
///
/// This implementation provides:
/// - Strict per-tag merge when loading (file entries overwrite memory)
/// - Deterministic output (keys sorted)
/// - Atomic replacement of the file on save
/// - Lock-guarded load-then-save reconciliation across processes
#[derive(Debug)]
pub struct FileBackedCacheStore {
    /// Cache configuration
    config: CacheConfig,

    /// In-memory entries
    cache: KeyedCache,

    /// Memoizer hits
    hits: u64,

    /// Memoizer misses
    misses: u64,
}

impl FileBackedCacheStore {
    /// Open a store with the given configuration
    ///
    /// With a path that exists, the file is merged into memory before anything
    /// else happens; a malformed file aborts construction. With a path that does
    /// not exist, an empty cache is written there right away.
    pub fn open(config: CacheConfig, tag: Option<&str>) -> Result<Self> {
        config.validate().map_err(WikiError::ConfigError)?;

        let mut store = Self {
            config,
            cache: KeyedCache::new(),
            hits: 0,
            misses: 0,
        };

        match store.config.path.clone() {
            Some(path) if path.exists() => {
                let merged = store.load_from(&path, tag)?;
                info!("Loaded {} cache entries from {:?}", merged, path);
            }
            Some(path) => {
                store.save_to(Some(&path), None, store.config.pretty)?;
                info!("Starting with empty cache at {:?}", path);
            }
            None => {
                warn!(
                    "No cache file specified. Initializing empty in-memory cache; \
                     provide a path when saving."
                );
            }
        }

        Ok(store)
    }

    /// Purely in-memory store
    pub fn in_memory() -> Self {
        Self {
            config: CacheConfig::default(),
            cache: KeyedCache::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Default file path, if any
    pub fn path(&self) -> Option<&Path> {
        self.config.path.as_deref()
    }

    /// Store configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Underlying in-memory cache
    pub fn cache(&self) -> &KeyedCache {
        &self.cache
    }

    /// Look up a cached value
    pub fn get(&self, tag: &str, key: &str) -> Option<&CacheValue> {
        self.cache.get(tag, key)
    }

    /// Insert or overwrite a cached value
    pub fn put(&mut self, tag: &str, key: impl Into<CacheKey>, value: CacheValue) {
        self.cache.put(tag, key, value);
    }

    /// Merge `tag -> mapping` into memory
    pub fn merge(&mut self, incoming: CacheMap) {
        self.cache.merge(incoming);
    }

    /// Merge a flat mapping into one tag
    pub fn merge_tag(&mut self, tag: &str, entries: crate::cache::types::TagEntries) {
        self.cache.merge_tag(tag, entries);
    }

    /// Number of entries per tag
    pub fn summary(&self) -> BTreeMap<CacheTag, usize> {
        self.cache.summary()
    }

    /// Ordered keys per tag
    pub fn keys_only(&self, tags: Option<&[&str]>) -> BTreeMap<CacheTag, Vec<CacheKey>> {
        self.cache.keys_only(tags)
    }

    /// Copy of the requested tags' entries
    pub fn snapshot(&self, tags: Option<&[&str]>) -> CacheMap {
        self.cache.snapshot(tags)
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Memoization statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.cache.len(),
        }
    }

    /// Parse a cache file
    pub fn read_cache_file(path: &Path) -> Result<CacheMap> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str::<CacheMap>(&content).map_err(|e| WikiError::ParseError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Merge a cache file into memory, returning the number of entries read
    ///
    /// With `tag`, only that tag's entries from the file are merged.
    pub fn load_from(&mut self, path: &Path, tag: Option<&str>) -> Result<usize> {
        let mut file_map = Self::read_cache_file(path)?;

        let merged = match tag {
            Some(tag) => {
                let entries = file_map.remove(tag).unwrap_or_default();
                let count = entries.len();
                self.cache.merge_tag(tag, entries);
                count
            }
            None => {
                let count = file_map.values().map(|entries| entries.len()).sum();
                self.cache.merge(file_map);
                count
            }
        };

        debug!("Merged {} entries from {:?}", merged, path);
        Ok(merged)
    }

    /// Write the requested tags to `path` (or the default path)
    ///
    /// Fails with `ConfigError` when neither is available.
    pub fn save_to(
        &self,
        path: Option<&Path>,
        tags: Option<&[&str]>,
        pretty: bool,
    ) -> Result<PathBuf> {
        let path = self.resolve_path(path)?;
        write_json(&self.cache.snapshot(tags), &path, pretty)?;
        debug!("Saved cache to {:?}", path);
        Ok(path)
    }

    /// Write the whole cache to the default path
    pub fn save(&self) -> Result<PathBuf> {
        self.save_to(None, None, self.config.pretty)
    }

    /// Reconcile memory with the file under the cross-process lock
    ///
    /// Loads the file, merges it into memory, then writes memory back, all while
    /// holding `<file>.lock`. With `tag`, only that tag is merged and rewritten and
    /// the file's other tags are kept as they were.
    ///
    /// On a key present both in memory and in the file, the file's value wins:
    /// the file is merged over memory before memory is written back.
    pub async fn synchronize(&mut self, tag: Option<&str>) -> Result<SyncReport> {
        let path = self.resolve_path(None)?;

        let _guard = FileLockGuard::acquire(
            &path,
            self.config.lock_timeout,
            self.config.lock_poll_interval,
        )
        .await?;

        let mut file_map = if path.exists() {
            Self::read_cache_file(&path)?
        } else {
            CacheMap::new()
        };

        let (merged_entries, to_write) = match tag {
            Some(tag) => {
                let entries = file_map.remove(tag).unwrap_or_default();
                let merged = entries.len();
                self.cache.merge_tag(tag, entries);
                file_map.insert(tag.to_string(), self.cache.tag_entries(tag));
                (merged, file_map)
            }
            None => {
                let merged = file_map.values().map(|entries| entries.len()).sum();
                self.cache.merge(file_map);
                (merged, self.cache.snapshot(None))
            }
        };

        let written_entries = to_write.values().map(|entries| entries.len()).sum();
        write_json(&to_write, &path, self.config.pretty)?;

        info!(
            "Synchronized cache with {:?} ({} merged, {} written)",
            path, merged_entries, written_entries
        );

        Ok(SyncReport {
            path,
            merged_entries,
            written_entries,
            synced_at: Utc::now(),
        })
    }

    fn resolve_path(&self, path: Option<&Path>) -> Result<PathBuf> {
        path.or(self.config.path.as_deref())
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                WikiError::ConfigError(
                    "No default filepath set for cache. Please provide a path.".to_string(),
                )
            })
    }
}

/// Serialize `data` to `path` via a sibling temp file and rename
fn write_json(data: &CacheMap, path: &Path, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let bytes = if pretty {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        data.serialize(&mut ser)?;
        buf
    } else {
        serde_json::to_vec(data)?
    };

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(format!(".tmp.{}", std::process::id()));
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, bytes)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(WikiError::Io(e));
    }

    Ok(())
}
