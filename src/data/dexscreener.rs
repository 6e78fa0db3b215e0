//! Market data provider: boosted (trending) tokens and per-token pairs.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, warn};

use crate::config::MarketDataConfig;
use crate::data::types::{MarketPair, Token};
use crate::error::TradingError;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Empty when the upstream reports nothing or fails.
    async fn get_trending(&self, max_results: usize) -> Vec<Token>;
    /// Empty when the upstream reports nothing or fails.
    async fn get_pairs(&self, address: &str, chain_id: &str) -> Vec<MarketPair>;
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct BoostedToken {
    chain_id: String,
    token_address: String,
    #[serde(default)]
    description: Option<String>,
}

impl BoostedToken {
    /// The boost feed carries no ticker, so the address tail stands in for it.
    fn into_token(self) -> Token {
        let symbol = self
            .token_address
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let name = self
            .description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| self.token_address.clone());
        Token {
            symbol,
            name,
            address: self.token_address,
            chain_id: self.chain_id,
            balance: None,
        }
    }
}

#[derive(Clone)]
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(config: &MarketDataConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, TradingError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(TradingError::remote("market data", format!("HTTP {}: {}", status, text)));
        }
        serde_json::from_str(&text)
            .map_err(|e| TradingError::Parse(format!("market data decode failed: {} (url: {})", e, url)))
    }

    pub async fn try_get_trending(&self, max_results: usize) -> Result<Vec<Token>, TradingError> {
        let url = format!("{}/token-boosts/top/v1", self.base_url);
        let boosted: Vec<BoostedToken> = self.fetch_json(&url).await?;
        Ok(boosted
            .into_iter()
            .take(max_results)
            .map(BoostedToken::into_token)
            .collect())
    }

    pub async fn try_get_pairs(&self, address: &str, chain_id: &str) -> Result<Vec<MarketPair>, TradingError> {
        let url = format!("{}/token-pairs/v1/{}/{}", self.base_url, chain_id, address);
        let pairs: Option<Vec<MarketPair>> = self.fetch_json(&url).await?;
        Ok(pairs.unwrap_or_default())
    }
}

#[async_trait]
impl MarketDataProvider for DexScreenerClient {
    async fn get_trending(&self, max_results: usize) -> Vec<Token> {
        match self.try_get_trending(max_results).await {
            Ok(tokens) => tokens,
            Err(e) => {
                error!("[MARKET] Failed to fetch trending tokens: {}", e);
                Vec::new()
            }
        }
    }

    async fn get_pairs(&self, address: &str, chain_id: &str) -> Vec<MarketPair> {
        match self.try_get_pairs(address, chain_id).await {
            Ok(pairs) if pairs.is_empty() => {
                warn!("[MARKET] No pairs found for token {} on {}", address, chain_id);
                pairs
            }
            Ok(pairs) => pairs,
            Err(e) => {
                error!("[MARKET] Failed to fetch token pairs for {}: {}", address, e);
                Vec::new()
            }
        }
    }
}
