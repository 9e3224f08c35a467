//! Cached Wikidata lookups
//!
//! Every public lookup on `WikiClient` goes through a `Memoizer` bound to its
//! own cache tag, so a given argument tuple reaches the network at most once
//! per process (until the cache file is reconciled with other processes).

use crate::cache::{
    tags, CacheConfig, CacheKey, CacheStats, CacheTag, CallArgs, FileBackedCacheStore, Memoizer,
    SharedCacheStore, SyncReport,
};
use crate::client::api::{WikiApi, UNRESOLVED_REDIRECT};
use crate::client::config::ClientConfig;
use crate::client::http::HttpWikiApi;
use crate::client::payload::{
    parse, ClaimsResponse, EntitiesResponse, QueryResponse, MISSING_PAGE_ID,
};
use crate::error::{Result, WikiError};
use crate::properties::{COUNTRY, COUNTRY_OF_CITIZENSHIP, INSTANCE_OF, SUBCLASS_OF};
use crate::resolver::CategoryResolver;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Entity identifier, e.g. `Q42`
pub type Qid = String;

/// Entity identifier paired with its label
pub type LabeledQid = (Qid, String);

/// Localized label and description of an entity
///
/// A language missing from the entity degrades to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub labels: String,
    pub descriptions: String,
}

/// Wikidata item behind a page title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleMatch {
    pub qid: Qid,
    pub title: String,
}

/// Wikidata client with a persistent memoization cache
pub struct WikiClient {
    api: Arc<dyn WikiApi>,
    cache: SharedCacheStore,
    config: ClientConfig,
}

impl WikiClient {
    /// Create an HTTP-backed client, loading the cache file if one is configured
    ///
    /// # Example
    /// ```no_run
    /// use wikikg::{CacheConfig, ClientConfig, WikiClient};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let client = WikiClient::new(
    ///         ClientConfig::default(),
    ///         CacheConfig::builder().path("wiki_cache.json").build(),
    ///     )?;
    ///
    ///     println!("{}", client.get_entity_name("Q42", "en").await?);
    ///     client.sync_cache(None).await?;
    ///     Ok(())
    /// }
    /// ```
    pub fn new(config: ClientConfig, cache_config: CacheConfig) -> Result<Self> {
        let api = HttpWikiApi::new(config.clone())?;
        let store = FileBackedCacheStore::open(cache_config, None)?;
        Ok(Self::with_api(Arc::new(api), store, config))
    }

    /// Create a client over any `WikiApi` implementation
    pub fn with_api(api: Arc<dyn WikiApi>, store: FileBackedCacheStore, config: ClientConfig) -> Self {
        info!(
            "Wikidata client ready (api: {}, cache: {:?})",
            config.api_url,
            store.path()
        );

        Self {
            api,
            cache: Arc::new(RwLock::new(store)),
            config,
        }
    }

    /// Shared handle to the cache store
    pub fn cache(&self) -> SharedCacheStore {
        self.cache.clone()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn memo(&self, tag: &str) -> Memoizer {
        Memoizer::new(self.cache.clone(), tag)
    }

    /// Label and description of `qid` in `lang`
    ///
    /// Fails with `NotFoundError` if the entity itself is absent from the payload.
    pub async fn get_entity_info(&self, qid: &str, lang: &str) -> Result<EntityInfo> {
        let args = CallArgs::new().arg(qid).arg(lang);
        self.memo(tags::ENTITY_INFO)
            .call(&args, || async move {
                let resp: EntitiesResponse =
                    parse(self.api.get_entities(qid, lang).await?, "wbgetentities")?;
                if let Some(err) = resp.error {
                    return Err(err.into_error("wbgetentities"));
                }

                let entity = resp
                    .entity(qid)
                    .filter(|entity| entity.missing.is_none())
                    .ok_or_else(|| WikiError::NotFoundError(format!("entity {}", qid)))?;

                Ok(EntityInfo {
                    labels: entity.label(lang),
                    descriptions: entity.description(lang),
                })
            })
            .await
    }

    /// Label of `qid` in `lang`; empty when the entity has no label in that language
    pub async fn get_entity_name(&self, qid: &str, lang: &str) -> Result<String> {
        Ok(self.get_entity_info(qid, lang).await?.labels)
    }

    /// Target entities of relation `pid` on `qid`, in claim order
    ///
    /// A redirected entity is resolved to its canonical id and queried once
    /// more. An absent relation yields an empty list.
    pub async fn get_entity_property(&self, qid: &str, pid: &str) -> Result<Vec<Qid>> {
        let args = CallArgs::new().arg(qid).arg(pid);
        self.memo(tags::ENTITY_PROP)
            .call(&args, || async move {
                let mut resp: ClaimsResponse =
                    parse(self.api.get_claims(qid, pid).await?, "wbgetclaims")?;

                if resp
                    .error
                    .as_ref()
                    .is_some_and(|err| err.code == UNRESOLVED_REDIRECT)
                {
                    let target = self.resolve_redirect(qid).await?;
                    info!("{} redirects to {}; retrying {}", qid, target, pid);
                    resp = parse(self.api.get_claims(&target, pid).await?, "wbgetclaims")?;
                }

                if let Some(err) = resp.error {
                    return Err(err.into_error("wbgetclaims"));
                }

                Ok(resp.target_ids(pid))
            })
            .await
    }

    async fn resolve_redirect(&self, qid: &str) -> Result<Qid> {
        let resp: EntitiesResponse = parse(
            self.api
                .get_entities(qid, &self.config.default_lang)
                .await?,
            "wbgetentities",
        )?;

        resp.entity(qid)
            .and_then(|entity| entity.redirects.as_ref())
            .map(|redirect| redirect.to.clone())
            .ok_or_else(|| WikiError::NotFoundError(format!("redirect target of {}", qid)))
    }

    /// "instance of" targets of `qid`
    pub async fn get_entity_type_ids(&self, qid: &str) -> Result<Vec<Qid>> {
        let args = CallArgs::new().arg(qid).arg(true);
        self.memo(tags::ENTITY_TYPE)
            .call(&args, || self.get_entity_property(qid, INSTANCE_OF))
            .await
    }

    /// "instance of" targets of `qid` with their labels
    pub async fn get_entity_type(&self, qid: &str) -> Result<Vec<LabeledQid>> {
        self.memo(tags::ENTITY_TYPE)
            .call(&self.labeled_args(qid), || async move {
                let qids = self.get_entity_property(qid, INSTANCE_OF).await?;
                self.label_all(qids).await
            })
            .await
    }

    /// Countries of citizenship of `qid`
    pub async fn get_nationality(&self, qid: &str) -> Result<Vec<LabeledQid>> {
        self.memo(tags::ENTITY_NATIONALITY)
            .call(&self.labeled_args(qid), || async move {
                let qids = self.get_entity_property(qid, COUNTRY_OF_CITIZENSHIP).await?;
                self.label_all(qids).await
            })
            .await
    }

    /// Countries `qid` is located in or belongs to
    pub async fn get_country(&self, qid: &str) -> Result<Vec<LabeledQid>> {
        self.memo(tags::ENTITY_COUNTRY)
            .call(&self.labeled_args(qid), || async move {
                let qids = self.get_entity_property(qid, COUNTRY).await?;
                self.label_all(qids).await
            })
            .await
    }

    /// Nationality if any, otherwise country
    ///
    /// The country relation is only queried when nationality comes back empty.
    pub async fn get_associated_country(&self, qid: &str) -> Result<Vec<LabeledQid>> {
        self.memo(tags::ASSOCIATED_COUNTRY)
            .call(&self.labeled_args(qid), || async move {
                let countries = self.get_nationality(qid).await?;
                if !countries.is_empty() {
                    return Ok(countries);
                }
                debug!("{} has no nationality; falling back to country", qid);
                self.get_country(qid).await
            })
            .await
    }

    /// Resolve a page title on the `lang` Wikipedia to its Wikidata item(s)
    ///
    /// Returns `page id -> match`; titles that do not exist are skipped.
    pub async fn search_entity_id_by_title(
        &self,
        title: &str,
        lang: &str,
    ) -> Result<BTreeMap<String, TitleMatch>> {
        let args = CallArgs::new().arg(title).arg(lang);
        self.memo(tags::ENTITY_ID_BY_TITLE)
            .call(&args, || async move {
                let resp: QueryResponse =
                    parse(self.api.query_titles(title, lang).await?, "query")?;
                if let Some(err) = resp.error {
                    return Err(err.into_error("query"));
                }

                let pages = resp.query.map(|q| q.pages).unwrap_or_default();
                let mut matches = BTreeMap::new();
                for (page_id, page) in pages {
                    if page_id == MISSING_PAGE_ID {
                        debug!("No page titled '{}' on {}", page.title, lang);
                        continue;
                    }
                    match page.pageprops.and_then(|props| props.wikibase_item) {
                        Some(qid) => {
                            matches.insert(
                                page_id,
                                TitleMatch {
                                    qid,
                                    title: page.title,
                                },
                            );
                        }
                        None => debug!("Page '{}' has no Wikidata item", page.title),
                    }
                }
                Ok(matches)
            })
            .await
    }

    /// "subclass of" targets of `qid`
    pub async fn get_superclasses(&self, qid: &str) -> Result<Vec<Qid>> {
        self.get_entity_property(qid, SUBCLASS_OF).await
    }

    /// First terminal category reached walking up from `qid`
    pub async fn resolve_category(
        &self,
        qid: &str,
        terminals: &HashSet<Qid>,
    ) -> Result<Option<Qid>> {
        CategoryResolver::new(self, terminals.clone())
            .resolve(qid)
            .await
    }

    /// Key arguments of a labeled lookup: labels depend on `default_lang`
    fn labeled_args(&self, qid: &str) -> CallArgs {
        CallArgs::of(qid).kwarg("lang", &self.config.default_lang)
    }

    async fn label_all(&self, qids: Vec<Qid>) -> Result<Vec<LabeledQid>> {
        let mut labeled = Vec::with_capacity(qids.len());
        for qid in qids {
            let name = self.get_entity_name(&qid, &self.config.default_lang).await?;
            labeled.push((qid, name));
        }
        Ok(labeled)
    }

    /// Write the cache to `path`, or to the configured cache file
    pub async fn save_cache(&self, path: Option<&Path>) -> Result<PathBuf> {
        let store = self.cache.read().await;
        let pretty = store.config().pretty;
        store.save_to(path, None, pretty)
    }

    /// Reconcile the cache with its file under the cross-process lock
    pub async fn sync_cache(&self, tag: Option<&str>) -> Result<SyncReport> {
        self.cache.write().await.synchronize(tag).await
    }

    /// Entry count per tag
    pub async fn cache_summary(&self) -> BTreeMap<CacheTag, usize> {
        self.cache.read().await.summary()
    }

    /// Cached keys per tag
    pub async fn cache_keys(&self, tags: Option<&[&str]>) -> BTreeMap<CacheTag, Vec<CacheKey>> {
        self.cache.read().await.keys_only(tags)
    }

    /// Hit/miss counters
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }
}
