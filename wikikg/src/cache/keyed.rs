//! In-memory `tag -> (key -> value)` mapping
//!
//! `KeyedCache` is the leaf of the cache layer. It never evicts: entries only
//! grow or get overwritten. Reading a tag that does not exist behaves like
//! reading an empty tag; writing to it creates the tag first.

use crate::cache::types::{CacheKey, CacheMap, CacheTag, CacheValue, TagEntries};
use std::collections::BTreeMap;

/// Namespaced key/value cache
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyedCache {
    tags: CacheMap,
}

impl KeyedCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached value
    pub fn get(&self, tag: &str, key: &str) -> Option<&CacheValue> {
        self.tags.get(tag).and_then(|entries| entries.get(key))
    }

    /// Insert or overwrite a value
    pub fn put(&mut self, tag: &str, key: impl Into<CacheKey>, value: CacheValue) {
        self.ensure_tag(tag).insert(key.into(), value);
    }

    /// Get the entries of `tag`, creating the tag if needed
    pub fn ensure_tag(&mut self, tag: &str) -> &mut TagEntries {
        self.tags.entry(tag.to_string()).or_default()
    }

    /// Merge a flat mapping into one tag; incoming keys win
    pub fn merge_tag(&mut self, tag: &str, entries: TagEntries) {
        self.ensure_tag(tag).extend(entries);
    }

    /// Merge a `tag -> mapping` structure tag by tag; incoming keys win
    ///
    /// Tags that exist only in `incoming` are created.
    pub fn merge(&mut self, incoming: CacheMap) {
        for (tag, entries) in incoming {
            self.merge_tag(&tag, entries);
        }
    }

    /// Copy of the requested tags' entries (all known tags when `None`)
    ///
    /// A requested tag that does not exist yields an empty mapping.
    pub fn snapshot(&self, tags: Option<&[&str]>) -> CacheMap {
        match tags {
            Some(tags) => tags
                .iter()
                .map(|tag| {
                    let entries = self.tags.get(*tag).cloned().unwrap_or_default();
                    (tag.to_string(), entries)
                })
                .collect(),
            None => self.tags.clone(),
        }
    }

    /// Entries of a single tag (empty when the tag is unknown)
    pub fn tag_entries(&self, tag: &str) -> TagEntries {
        self.tags.get(tag).cloned().unwrap_or_default()
    }

    /// Ordered keys of the requested tags (all known tags when `None`)
    pub fn keys_only(&self, tags: Option<&[&str]>) -> BTreeMap<CacheTag, Vec<CacheKey>> {
        self.snapshot(tags)
            .into_iter()
            .map(|(tag, entries)| (tag, entries.into_keys().collect()))
            .collect()
    }

    /// Number of entries per tag
    pub fn summary(&self) -> BTreeMap<CacheTag, usize> {
        self.tags
            .iter()
            .map(|(tag, entries)| (tag.clone(), entries.len()))
            .collect()
    }

    /// Total number of entries across all tags
    pub fn len(&self) -> usize {
        self.tags.values().map(|entries| entries.len()).sum()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
