//! Core type definitions for the cache system

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Cache namespace, one per cached operation (e.g. `entity_info`)
pub type CacheTag = String;

/// Normalized key derived from the arguments of a cached call
pub type CacheKey = String;

/// Cached value - any JSON-compatible structure
pub type CacheValue = serde_json::Value;

/// Entries of a single tag, kept sorted so serialization is deterministic
pub type TagEntries = BTreeMap<CacheKey, CacheValue>;

/// Full cache contents: `tag -> (key -> value)`
pub type CacheMap = BTreeMap<CacheTag, TagEntries>;

/// Well-known cache tags used by the Wikidata client
pub mod tags {
    pub const ENTITY_INFO: &str = "entity_info";
    pub const ENTITY_PROP: &str = "entity_prop";
    pub const ENTITY_TYPE: &str = "entity_type";
    pub const ENTITY_NATIONALITY: &str = "entity_nationality";
    pub const ENTITY_COUNTRY: &str = "entity_country";
    pub const ASSOCIATED_COUNTRY: &str = "associated_country";
    pub const ENTITY_ID_BY_TITLE: &str = "entity_id_by_title";
}

/// Statistics for memoized lookups
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,

    /// Lookups that invoked the wrapped operation
    pub misses: u64,

    /// Number of entries currently in cache, across all tags
    pub entries: usize,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Calculate miss rate as a percentage
    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, entries: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.entries
        )
    }
}
