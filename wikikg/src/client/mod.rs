//! Wikidata API client
//!
//! - `api`: the `WikiApi` network boundary
//! - `http`: reqwest implementation of that boundary
//! - `entity`: `WikiClient`, the memoized lookups built on top

pub mod api;
pub mod config;
pub mod entity;
pub mod http;
mod payload;

pub use api::{WikiApi, UNRESOLVED_REDIRECT};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use entity::{EntityInfo, LabeledQid, Qid, TitleMatch, WikiClient};
pub use http::HttpWikiApi;
