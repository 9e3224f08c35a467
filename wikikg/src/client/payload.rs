//! Response shapes consumed from the action API
//!
//! Only the fields the client reads are modelled; everything else in the
//! payloads is ignored.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{Result, WikiError};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub info: Option<String>,
}

impl ApiErrorBody {
    pub fn into_error(self, action: &str) -> WikiError {
        WikiError::UpstreamError(format!(
            "{} failed with code '{}': {}",
            action,
            self.code,
            self.info.unwrap_or_default()
        ))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaimsResponse {
    #[serde(default)]
    pub claims: HashMap<String, Vec<Claim>>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Claim {
    pub mainsnak: Snak,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Snak {
    pub snaktype: String,
    #[serde(default)]
    pub datavalue: Option<DataValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataValue {
    pub value: Value,
}

impl ClaimsResponse {
    /// Target entity ids of `pid`, in claim order; `value` snaks only
    pub fn target_ids(&self, pid: &str) -> Vec<String> {
        self.claims
            .get(pid)
            .map(|claims| {
                claims
                    .iter()
                    .filter(|claim| claim.mainsnak.snaktype == "value")
                    .filter_map(|claim| claim.mainsnak.datavalue.as_ref())
                    .filter_map(|dv| dv.value.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntitiesResponse {
    #[serde(default)]
    pub entities: HashMap<String, EntityPayload>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntityPayload {
    #[serde(default)]
    pub labels: HashMap<String, LangValue>,
    #[serde(default)]
    pub descriptions: HashMap<String, LangValue>,
    #[serde(default)]
    pub redirects: Option<Redirect>,
    #[serde(default)]
    pub missing: Option<Value>,
}

impl EntityPayload {
    /// Label in `lang`, empty when absent
    pub fn label(&self, lang: &str) -> String {
        localized(&self.labels, lang)
    }

    /// Description in `lang`, empty when absent
    pub fn description(&self, lang: &str) -> String {
        localized(&self.descriptions, lang)
    }
}

fn localized(field: &HashMap<String, LangValue>, lang: &str) -> String {
    field
        .get(lang)
        .map(|v| v.value.clone())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
pub(crate) struct LangValue {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Redirect {
    #[serde(default)]
    pub from: Option<String>,
    pub to: String,
}

impl EntitiesResponse {
    /// Payload for `qid`, falling back to an entry that redirects from it
    pub fn entity(&self, qid: &str) -> Option<&EntityPayload> {
        self.entities.get(qid).or_else(|| {
            self.entities.values().find(|entity| {
                entity
                    .redirects
                    .as_ref()
                    .and_then(|r| r.from.as_deref())
                    == Some(qid)
            })
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub query: Option<QueryBody>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryBody {
    #[serde(default)]
    pub pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Page {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageProps {
    #[serde(default)]
    pub wikibase_item: Option<String>,
}

/// Page id the query API uses for titles that do not exist
pub(crate) const MISSING_PAGE_ID: &str = "-1";

/// Deserialize a raw response, reporting shape problems as upstream errors
pub(crate) fn parse<T: serde::de::DeserializeOwned>(value: Value, action: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| WikiError::UpstreamError(format!("malformed {} response: {}", action, e)))
}
