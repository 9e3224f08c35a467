//! In-memory stand-in for the Wikidata action API
//!
//! Builds the same JSON shapes the real endpoints return and counts calls per
//! endpoint so tests can assert when the cache avoided a request.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wikikg::{
    ClientConfig, FileBackedCacheStore, Result, WikiApi, WikiClient, WikiError,
};

#[derive(Default)]
pub struct FakeWikiApi {
    known: HashSet<String>,
    labels: HashMap<String, HashMap<String, String>>,
    descriptions: HashMap<String, HashMap<String, String>>,
    claims: HashMap<(String, String), Vec<String>>,
    redirects: HashMap<String, String>,
    pages: HashMap<(String, String), (String, Option<String>)>,
    failing_claims: AtomicUsize,
    pub entity_calls: AtomicUsize,
    pub claim_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub claim_log: Mutex<Vec<(String, String)>>,
}

impl FakeWikiApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, qid: &str, lang: &str, label: &str) -> Self {
        self.known.insert(qid.to_string());
        self.labels
            .entry(qid.to_string())
            .or_default()
            .insert(lang.to_string(), label.to_string());
        self
    }

    pub fn with_description(mut self, qid: &str, lang: &str, description: &str) -> Self {
        self.known.insert(qid.to_string());
        self.descriptions
            .entry(qid.to_string())
            .or_default()
            .insert(lang.to_string(), description.to_string());
        self
    }

    pub fn with_claim(mut self, qid: &str, pid: &str, targets: &[&str]) -> Self {
        self.known.insert(qid.to_string());
        self.claims.insert(
            (qid.to_string(), pid.to_string()),
            targets.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    pub fn with_page(mut self, lang: &str, title: &str, page_id: &str, qid: Option<&str>) -> Self {
        self.pages.insert(
            (lang.to_string(), title.to_string()),
            (page_id.to_string(), qid.map(str::to_string)),
        );
        self
    }

    /// Make the next `n` claim requests fail with an upstream error
    pub fn fail_next_claims(&self, n: usize) {
        self.failing_claims.store(n, Ordering::SeqCst);
    }

    pub fn entity_calls(&self) -> usize {
        self.entity_calls.load(Ordering::SeqCst)
    }

    pub fn claim_calls(&self) -> usize {
        self.claim_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.entity_calls() + self.claim_calls() + self.query_calls()
    }

    pub fn claims_requested_for(&self, pid: &str) -> usize {
        self.claim_log
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, p)| p == pid)
            .count()
    }

    fn localized(map: Option<&HashMap<String, String>>, lang: &str) -> Value {
        let mut out = Map::new();
        if let Some(value) = map.and_then(|m| m.get(lang)) {
            out.insert(lang.to_string(), json!({"language": lang, "value": value}));
        }
        Value::Object(out)
    }

    fn entity_json(&self, qid: &str, lang: &str) -> Value {
        json!({
            "type": "item",
            "id": qid,
            "labels": Self::localized(self.labels.get(qid), lang),
            "descriptions": Self::localized(self.descriptions.get(qid), lang),
        })
    }
}

#[async_trait]
impl WikiApi for FakeWikiApi {
    async fn get_entities(&self, ids: &str, lang: &str) -> Result<Value> {
        self.entity_calls.fetch_add(1, Ordering::SeqCst);

        let mut entities = Map::new();
        for id in ids.split('|') {
            if let Some(to) = self.redirects.get(id) {
                let mut entity = self.entity_json(to, lang);
                entity["redirects"] = json!({"from": id, "to": to});
                entities.insert(to.clone(), entity);
            } else if self.known.contains(id) {
                entities.insert(id.to_string(), self.entity_json(id, lang));
            } else {
                entities.insert(id.to_string(), json!({"id": id, "missing": ""}));
            }
        }

        Ok(json!({"entities": entities, "success": 1}))
    }

    async fn get_claims(&self, entity: &str, property: &str) -> Result<Value> {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
        self.claim_log
            .lock()
            .unwrap()
            .push((entity.to_string(), property.to_string()));

        let failing = self.failing_claims.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_claims.store(failing - 1, Ordering::SeqCst);
            return Err(WikiError::UpstreamError("wbgetclaims returned HTTP 503".to_string()));
        }

        if self.redirects.contains_key(entity) {
            return Ok(json!({
                "error": {
                    "code": "unresolved-redirect",
                    "info": "The given entity ID refers to a redirect, which is not supported in this context."
                }
            }));
        }

        let mut claims = Map::new();
        if let Some(targets) = self.claims.get(&(entity.to_string(), property.to_string())) {
            let statements: Vec<Value> = targets
                .iter()
                .map(|target| {
                    json!({
                        "mainsnak": {
                            "snaktype": "value",
                            "property": property,
                            "datavalue": {
                                "value": {"entity-type": "item", "id": target},
                                "type": "wikibase-entityid"
                            }
                        },
                        "type": "statement",
                        "rank": "normal"
                    })
                })
                .collect();
            claims.insert(property.to_string(), Value::Array(statements));
        }

        Ok(json!({"claims": claims}))
    }

    async fn query_titles(&self, titles: &str, lang: &str) -> Result<Value> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);

        let mut pages = Map::new();
        for title in titles.split('|') {
            match self.pages.get(&(lang.to_string(), title.to_string())) {
                Some((page_id, qid)) => {
                    let mut page = json!({"pageid": page_id, "ns": 0, "title": title});
                    if let Some(qid) = qid {
                        page["pageprops"] = json!({"wikibase_item": qid});
                    }
                    pages.insert(page_id.clone(), page);
                }
                None => {
                    pages.insert("-1".to_string(), json!({"ns": 0, "title": title, "missing": ""}));
                }
            }
        }

        Ok(json!({"batchcomplete": "", "query": {"pages": pages}}))
    }
}

/// Client over `api` with an in-memory cache
pub fn client_for(api: Arc<FakeWikiApi>) -> WikiClient {
    WikiClient::with_api(api, FileBackedCacheStore::in_memory(), ClientConfig::default())
}

/// Client over `api` with the given store
pub fn client_with_store(api: Arc<FakeWikiApi>, store: FileBackedCacheStore) -> WikiClient {
    WikiClient::with_api(api, store, ClientConfig::default())
}

/// Opt-in log output for debugging tests: `RUST_LOG=wikikg=debug`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
