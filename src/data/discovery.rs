//! Candidate token sources merged by the workflow each iteration.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::DiscoveryConfig;
use crate::constants;
use crate::data::dexscreener::MarketDataProvider;
use crate::data::types::Token;
use crate::error::TradingError;

#[async_trait]
pub trait TokenSource: Send + Sync {
    fn name(&self) -> &str;
    /// Empty on failure; sources never fail an iteration.
    async fn fetch_tokens(&self) -> Vec<Token>;
}

// ============= Top wallets =============

#[derive(Deserialize, Debug)]
struct TopWalletToken {
    address: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
}

#[derive(Deserialize, Debug, Default)]
struct TopWalletData {
    #[serde(default)]
    tokens: Vec<TopWalletToken>,
}

#[derive(Deserialize, Debug)]
struct TopWalletResponse {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: TopWalletData,
}

/// Tokens most traded in the last hour by tracked top wallets.
pub struct TopWalletsSource {
    client: Client,
    base_url: String,
    api_key: String,
    limit: usize,
}

impl TopWalletsSource {
    pub fn new(config: &DiscoveryConfig) -> Result<Self, TradingError> {
        let api_key = config
            .top_wallets_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| TradingError::Config("top wallets API key is not set".to_string()))?;

        Ok(Self {
            client: Client::new(),
            base_url: config.top_wallets_url.trim_end_matches('/').to_string(),
            api_key,
            limit: constants::workflow::TOP_WALLET_TOKENS,
        })
    }

    async fn try_fetch(&self) -> Result<Vec<Token>, TradingError> {
        let url = format!("{}/api/bot/solana/top-wallets-token", self.base_url);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(TradingError::remote("top wallets", format!("HTTP {}: {}", status, text)));
        }

        let body: TopWalletResponse = serde_json::from_str(&text)?;
        if !body.success {
            return Err(TradingError::remote("top wallets", body.message));
        }

        Ok(body
            .data
            .tokens
            .into_iter()
            .take(self.limit)
            .map(|t| Token::new(&t.symbol, &t.name, &t.address, "solana"))
            .collect())
    }
}

#[async_trait]
impl TokenSource for TopWalletsSource {
    fn name(&self) -> &str {
        "top-wallets"
    }

    async fn fetch_tokens(&self) -> Vec<Token> {
        match self.try_fetch().await {
            Ok(tokens) => tokens,
            Err(e) => {
                error!("[DISCOVERY] Top wallets token error: {}", e);
                Vec::new()
            }
        }
    }
}

// ============= Experienced buyers =============

/// Screening parameters for the experienced-buyers feed.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreeningParams {
    pub chain: String,
    pub one_week_experienced_net_buyers_change: u64,
    pub min_market_cap: u64,
    pub twitter_followers: u64,
    pub one_month_volume_change_usd: u64,
    pub security_score: u64,
    pub one_month_price_percent_change_usd: u64,
}

impl ScreeningParams {
    pub fn for_chain(chain: &str) -> Self {
        Self {
            chain: chain.to_string(),
            one_week_experienced_net_buyers_change: 10,
            min_market_cap: 100_000_000,
            twitter_followers: 10_000,
            one_month_volume_change_usd: 10_000,
            security_score: 70,
            one_month_price_percent_change_usd: 1,
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("chain", self.chain.clone()),
            (
                "one_week_experienced_net_buyers_change",
                self.one_week_experienced_net_buyers_change.to_string(),
            ),
            ("min_market_cap", self.min_market_cap.to_string()),
            ("twitter_followers", self.twitter_followers.to_string()),
            ("one_month_volume_change_usd", self.one_month_volume_change_usd.to_string()),
            ("security_score", self.security_score.to_string()),
            (
                "one_month_price_percent_change_usd",
                self.one_month_price_percent_change_usd.to_string(),
            ),
        ]
    }
}

#[derive(Deserialize, Debug)]
struct ExperiencedBuyerToken {
    chain_id: String,
    token_address: String,
    #[serde(default)]
    token_name: String,
    #[serde(default)]
    token_symbol: String,
}

pub struct ExperiencedBuyersSource {
    client: Client,
    base_url: String,
    api_key: String,
    params: ScreeningParams,
}

impl ExperiencedBuyersSource {
    pub fn new(config: &DiscoveryConfig, api_key: Option<String>) -> Result<Self, TradingError> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| TradingError::Config("experienced buyers API key is not set".to_string()))?;

        Ok(Self {
            client: Client::new(),
            base_url: config.experienced_buyers_url.trim_end_matches('/').to_string(),
            api_key,
            params: ScreeningParams::for_chain(&config.experienced_buyers_chain),
        })
    }

    async fn try_fetch(&self) -> Result<Vec<Token>, TradingError> {
        let url = format!("{}/discovery/tokens/experienced-buyers", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&self.params.query_pairs())
            .header("Accept", "application/json")
            .header("X-API-Key", &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(TradingError::remote("experienced buyers", format!("HTTP {}: {}", status, text)));
        }

        let tokens: Vec<ExperiencedBuyerToken> = serde_json::from_str(&text)?;
        Ok(tokens
            .into_iter()
            .map(|t| Token::new(&t.token_symbol, &t.token_name, &t.token_address, &t.chain_id))
            .collect())
    }
}

#[async_trait]
impl TokenSource for ExperiencedBuyersSource {
    fn name(&self) -> &str {
        "experienced-buyers"
    }

    async fn fetch_tokens(&self) -> Vec<Token> {
        match self.try_fetch().await {
            Ok(tokens) => tokens,
            Err(e) => {
                error!("[DISCOVERY] Failed to fetch experienced buyer tokens: {}", e);
                Vec::new()
            }
        }
    }
}

// ============= Trending =============

/// The market data provider's boosted feed as a discovery source.
pub struct TrendingSource {
    provider: Arc<dyn MarketDataProvider>,
    max_results: usize,
}

impl TrendingSource {
    pub fn new(provider: Arc<dyn MarketDataProvider>, max_results: usize) -> Self {
        Self { provider, max_results }
    }
}

#[async_trait]
impl TokenSource for TrendingSource {
    fn name(&self) -> &str {
        "trending"
    }

    async fn fetch_tokens(&self) -> Vec<Token> {
        let tokens = self.provider.get_trending(self.max_results).await;
        if tokens.is_empty() {
            warn!("[DISCOVERY] Trending feed returned no tokens");
        }
        tokens
    }
}

/// Builds every source whose credentials are present.
pub fn build_sources(
    config: &DiscoveryConfig,
    experienced_buyers_key: Option<String>,
    market: Arc<dyn MarketDataProvider>,
    trending_max_results: usize,
) -> Vec<Arc<dyn TokenSource>> {
    let mut sources: Vec<Arc<dyn TokenSource>> = Vec::new();

    match TopWalletsSource::new(config) {
        Ok(s) => sources.push(Arc::new(s)),
        Err(e) => warn!("[DISCOVERY] Top wallets source disabled: {}", e),
    }
    match ExperiencedBuyersSource::new(config, experienced_buyers_key) {
        Ok(s) => sources.push(Arc::new(s)),
        Err(e) => warn!("[DISCOVERY] Experienced buyers source disabled: {}", e),
    }
    if config.include_trending {
        sources.push(Arc::new(TrendingSource::new(market, trending_max_results)));
    }

    info!(
        "[DISCOVERY] Active sources: {:?}",
        sources.iter().map(|s| s.name().to_string()).collect::<Vec<_>>()
    );
    sources
}
