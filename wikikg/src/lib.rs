//! # wikikg
//!
//! A Wikidata client for Rust with a persistent memoization cache.
//!
//! ## Features
//!
//! - Entity lookups: label/description, relation targets, type, nationality, country
//! - Title search against Wikipedia page titles
//! - Breadth-first category resolution over "subclass of" edges
//! - Every lookup memoized per argument tuple; failures are never cached
//! - Cache persisted as JSON and reconciled across processes under a file lock
//!
//! ## Entity Lookups
//!
//! ```no_run
//! use wikikg::{CacheConfig, ClientConfig, WikiClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = WikiClient::new(
//!         ClientConfig::default(),
//!         CacheConfig::builder().path("wiki_cache.json").build(),
//!     )?;
//!
//!     let name = client.get_entity_name("Q76", "en").await?;
//!     let countries = client.get_associated_country("Q76").await?;
//!     println!("{} -> {:?}", name, countries);
//!     Ok(())
//! }
//! ```
//!
//! ## Category Resolution
//!
//! ```no_run
//! use wikikg::{default_terminal_categories, CacheConfig, ClientConfig, WikiClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = WikiClient::new(ClientConfig::default(), CacheConfig::default())?;
//!
//!     let category = client
//!         .resolve_category("Q34221", &default_terminal_categories())
//!         .await?;
//!     println!("Category: {:?}", category);
//!     Ok(())
//! }
//! ```
//!
//! ## Sharing the Cache Between Processes
//!
//! ```no_run
//! use wikikg::{CacheConfig, ClientConfig, WikiClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = WikiClient::new(
//!         ClientConfig::default(),
//!         CacheConfig::builder().path("wiki_cache.json").build(),
//!     )?;
//!
//!     client.get_entity_type("Q42").await?;
//!
//!     // Merge what other processes wrote, then write our entries back
//!     let report = client.sync_cache(None).await?;
//!     println!("{} entries on disk", report.written_entries);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod properties;
pub mod resolver;

// Re-export main types for convenience
pub use cache::{
    CacheConfig, CacheConfigBuilder, CacheStats, CallArgs, FileBackedCacheStore, KeyedCache,
    Memoizer, SyncReport,
};
pub use client::{
    ClientConfig, ClientConfigBuilder, EntityInfo, HttpWikiApi, LabeledQid, Qid, TitleMatch,
    WikiApi, WikiClient,
};
pub use error::{Result, WikiError};
pub use properties::default_terminal_categories;
pub use resolver::CategoryResolver;
