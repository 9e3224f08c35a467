//! # Persistent Memoization Cache
//!
//! This module implements the caching layer behind the Wikidata client.
//!
//! ## Features
//!
//! - **Namespaced entries**: `tag -> (key -> value)`, one tag per cached operation
//! - **No eviction**: entries never expire; the cache only grows or is overwritten
//! - **File persistence**: load on open, explicit save, deterministic sorted JSON
//! - **Cross-process reconciliation**: `synchronize` merges and rewrites the file
//!   under an advisory lock on `<file>.lock`
//! - **Memoization**: `Memoizer` runs a lookup at most once per key and never
//!   caches failures
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tokio::sync::RwLock;
//! use wikikg::cache::{CallArgs, FileBackedCacheStore, Memoizer};
//!
//! # async fn example() -> wikikg::Result<()> {
//! let store = Arc::new(RwLock::new(FileBackedCacheStore::in_memory()));
//! let memo = Memoizer::new(store.clone(), "entity_prop");
//!
//! let targets: Vec<String> = memo
//!     .call(&CallArgs::new().arg("Q42").arg("P31"), || async {
//!         Ok(vec!["Q5".to_string()])
//!     })
//!     .await?;
//! assert_eq!(targets, vec!["Q5".to_string()]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod keyed;
pub mod lock;
pub mod memo;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use keyed::KeyedCache;
pub use lock::{lock_path_for, FileLockGuard};
pub use memo::{default_key, ArgValue, CallArgs, KeyFn, Memoized, Memoizer, SharedCacheStore};
pub use store::{FileBackedCacheStore, SyncReport};
pub use types::{tags, CacheKey, CacheMap, CacheStats, CacheTag, CacheValue, TagEntries};
