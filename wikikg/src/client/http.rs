//! HTTP implementation of `WikiApi` backed by reqwest

use crate::client::api::WikiApi;
use crate::client::config::ClientConfig;
use crate::error::{Result, WikiError};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Talks to the public action APIs over HTTPS
#[derive(Debug, Clone)]
pub struct HttpWikiApi {
    /// HTTP client
    client: reqwest::Client,
    /// Endpoints and timeout
    config: ClientConfig,
}

impl HttpWikiApi {
    /// Create a new API handle
    ///
    /// Every request carries the configured `User-Agent` and fails with
    /// `TimeoutError` once `request_timeout` elapses.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate().map_err(WikiError::ConfigError)?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WikiError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_json(&self, url: &str, action: &str, params: &[(&str, &str)]) -> Result<Value> {
        debug!("GET {} action={} {:?}", url, action, params);

        let response = self
            .client
            .get(url)
            .query(&[("action", action), ("format", "json")])
            .query(params)
            .send()
            .await
            .map_err(|e| self.map_request_error(e, action))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikiError::UpstreamError(format!(
                "{} returned HTTP {}",
                action, status
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| self.map_request_error(e, action))
    }

    fn map_request_error(&self, e: reqwest::Error, action: &str) -> WikiError {
        if e.is_timeout() {
            WikiError::TimeoutError {
                timeout: self.config.request_timeout,
                context: action.to_string(),
            }
        } else if e.is_decode() {
            WikiError::UpstreamError(format!("malformed JSON from {}: {}", action, e))
        } else {
            WikiError::UpstreamError(format!("{} request failed: {}", action, e))
        }
    }
}

#[async_trait]
impl WikiApi for HttpWikiApi {
    async fn get_entities(&self, ids: &str, lang: &str) -> Result<Value> {
        self.get_json(
            &self.config.api_url,
            "wbgetentities",
            &[("ids", ids), ("languages", lang)],
        )
        .await
    }

    async fn get_claims(&self, entity: &str, property: &str) -> Result<Value> {
        self.get_json(
            &self.config.api_url,
            "wbgetclaims",
            &[("entity", entity), ("property", property)],
        )
        .await
    }

    async fn query_titles(&self, titles: &str, lang: &str) -> Result<Value> {
        let url = self.config.title_api_url_for(lang);
        self.get_json(
            &url,
            "query",
            &[
                ("prop", "pageprops"),
                ("ppprop", "wikibase_item"),
                ("redirects", "1"),
                ("titles", titles),
            ],
        )
        .await
    }
}
