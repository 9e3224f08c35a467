//! Network boundary of the client
//!
//! `WikiApi` is the opaque capability the client calls into: three GET-style
//! actions returning raw JSON documents. `HttpWikiApi` is the production
//! implementation; tests substitute an in-memory graph.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Error code returned by `wbgetclaims` for a merged (redirected) entity
pub const UNRESOLVED_REDIRECT: &str = "unresolved-redirect";

/// Raw access to the Wikidata / Wikipedia action APIs
#[async_trait]
pub trait WikiApi: Send + Sync {
    /// `action=wbgetentities` for `ids`, restricted to `lang`
    async fn get_entities(&self, ids: &str, lang: &str) -> Result<Value>;

    /// `action=wbgetclaims` for one entity and property
    async fn get_claims(&self, entity: &str, property: &str) -> Result<Value>;

    /// `action=query` resolving page `titles` to their Wikidata items on the `lang` wiki
    async fn query_titles(&self, titles: &str, lang: &str) -> Result<Value>;
}
