//! Social search provider (REST).

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use url::Url;
use serde::Deserialize;
use tracing::debug;

use crate::config::SocialConfig;
use crate::data::types::SocialItem;
use crate::error::TradingError;

/// One upstream search, covering `[from, to]`.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub max_results: usize,
}

#[async_trait]
pub trait SocialSearchApi: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SocialItem>, TradingError>;
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    ok: Option<Vec<SocialItem>>,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct CookieSearchApi {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CookieSearchApi {
    pub fn new(config: &SocialConfig) -> Result<Self, TradingError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| TradingError::Config("social search API key is not set".to_string()))?;

        Ok(Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            api_key,
        })
    }

    fn search_url(&self, request: &SearchRequest) -> Result<Url, TradingError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| TradingError::Config(format!("invalid social base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| TradingError::Config("social base url cannot be a base".to_string()))?
            .push("search")
            .push(&request.query);
        url.query_pairs_mut()
            .append_pair("from", &request.from.to_rfc3339_opts(SecondsFormat::Millis, true))
            .append_pair("to", &request.to.to_rfc3339_opts(SecondsFormat::Millis, true))
            .append_pair("max_results", &request.max_results.to_string());
        Ok(url)
    }
}

#[async_trait]
impl SocialSearchApi for CookieSearchApi {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SocialItem>, TradingError> {
        let url = self.search_url(request)?;
        let resp = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(TradingError::remote("social search", format!("HTTP {}: {}", status, text)));
        }

        let body: SearchResponse = serde_json::from_str(&text)
            .map_err(|e| TradingError::Parse(format!("social search decode failed: {} (body: {})", e, text)))?;

        if let Some(err) = body.error.filter(|e| !e.is_empty()) {
            return Err(TradingError::remote("social search", err));
        }

        debug!(
            "[SIGNAL] Provider returned success={} for '{}'",
            body.success, request.query
        );
        Ok(body.ok.unwrap_or_default())
    }
}
