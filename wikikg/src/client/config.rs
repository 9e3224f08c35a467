//! Configuration for the Wikidata API client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Wikidata action API endpoint
pub const WIKIDATA_API_URL: &str = "https://www.wikidata.org/w/api.php";

/// Default per-language Wikipedia endpoint; `{lang}` is substituted
pub const WIKIPEDIA_API_URL_TEMPLATE: &str = "https://{lang}.wikipedia.org/w/api.php";

/// Default network timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for `HttpWikiApi` and `WikiClient`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Wikidata action API endpoint
    pub api_url: String,
    /// Wikipedia endpoint template used for title lookups
    pub title_api_url: String,
    /// Timeout for a single HTTP request
    pub request_timeout: Duration,
    /// Language used when the caller does not pass one
    pub default_lang: String,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: WIKIDATA_API_URL.to_string(),
            title_api_url: WIKIPEDIA_API_URL_TEMPLATE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_lang: "en".to_string(),
            user_agent: format!("wikikg/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for client configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Read overrides from the environment, honoring a `.env` file
    ///
    /// Recognized: `WIKIKG_API_URL`, `WIKIKG_TITLE_API_URL`, `WIKIKG_TIMEOUT_SECS`,
    /// `WIKIKG_LANG`, `WIKIKG_USER_AGENT`.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let defaults = Self::default();
        Self {
            api_url: std::env::var("WIKIKG_API_URL").unwrap_or(defaults.api_url),
            title_api_url: std::env::var("WIKIKG_TITLE_API_URL")
                .unwrap_or(defaults.title_api_url),
            request_timeout: std::env::var("WIKIKG_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            default_lang: std::env::var("WIKIKG_LANG").unwrap_or(defaults.default_lang),
            user_agent: std::env::var("WIKIKG_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_url.is_empty() {
            return Err("api_url must not be empty".to_string());
        }

        if !self.title_api_url.contains("{lang}") {
            return Err("title_api_url must contain a {lang} placeholder".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("request_timeout must be greater than 0".to_string());
        }

        if self.default_lang.is_empty() {
            return Err("default_lang must not be empty".to_string());
        }

        Ok(())
    }

    /// Wikipedia endpoint for `lang`
    pub fn title_api_url_for(&self, lang: &str) -> String {
        self.title_api_url.replace("{lang}", lang)
    }
}

/// Builder for client configuration
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    api_url: Option<String>,
    title_api_url: Option<String>,
    request_timeout: Option<Duration>,
    default_lang: Option<String>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn title_api_url(mut self, template: impl Into<String>) -> Self {
        self.title_api_url = Some(template.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn default_lang(mut self, lang: impl Into<String>) -> Self {
        self.default_lang = Some(lang.into());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client configuration
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();

        ClientConfig {
            api_url: self.api_url.unwrap_or(defaults.api_url),
            title_api_url: self.title_api_url.unwrap_or(defaults.title_api_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            default_lang: self.default_lang.unwrap_or(defaults.default_lang),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        }
    }
}
