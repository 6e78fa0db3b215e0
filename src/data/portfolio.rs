//! Wallet holdings and swap-history based cost basis.

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::PortfolioConfig;
use crate::data::types::{Holdings, SwapKind, SwapTransaction, Token, TokenBalance};
use crate::error::TradingError;

#[async_trait]
pub trait PortfolioProvider: Send + Sync {
    async fn get_holdings(&self) -> Result<Holdings, TradingError>;
    async fn get_swap_history(&self, token_address: &str) -> Result<Vec<SwapTransaction>, TradingError>;
}

/// Replays swaps into an average native price per held unit. Zero when nothing is held.
pub fn average_cost_basis(swaps: &[SwapTransaction], token_address: &str) -> f64 {
    let mut net_tokens = 0.0;
    let mut total_cost = 0.0;

    for swap in swaps {
        match swap.transaction_type {
            SwapKind::Buy if swap.bought.address.eq_ignore_ascii_case(token_address) => {
                net_tokens += swap.bought.amount();
                total_cost += swap.sold.amount();
            }
            SwapKind::Sell if swap.sold.address.eq_ignore_ascii_case(token_address) => {
                net_tokens -= swap.sold.amount();
                total_cost -= swap.bought.amount();
            }
            _ => {}
        }
    }

    if net_tokens > 0.0 {
        total_cost / net_tokens
    } else {
        0.0
    }
}

#[derive(Deserialize, Debug)]
struct NativeBalance {
    #[serde(default)]
    solana: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WalletToken {
    mint: String,
    amount: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PortfolioResponse {
    native_balance: NativeBalance,
    #[serde(default)]
    tokens: Vec<WalletToken>,
}

#[derive(Deserialize, Debug)]
struct SwapHistoryResponse {
    #[serde(default)]
    result: Vec<SwapTransaction>,
}

#[derive(Clone)]
pub struct MoralisPortfolioClient {
    client: Client,
    base_url: String,
    network: String,
    api_key: String,
    wallet_address: String,
}

impl MoralisPortfolioClient {
    pub fn new(config: &PortfolioConfig) -> Result<Self, TradingError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| TradingError::Config("portfolio API key is not set".to_string()))?;
        let wallet_address = config
            .wallet_address
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| TradingError::Config("wallet public key is not set".to_string()))?;

        Ok(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            network: config.network.clone(),
            api_key,
            wallet_address,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, TradingError> {
        let resp = self
            .client
            .get(url)
            .header("accept", "application/json")
            .header("X-API-Key", &self.api_key)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(TradingError::remote("portfolio", format!("HTTP {}: {}", status, text)));
        }
        Ok(text)
    }
}

#[async_trait]
impl PortfolioProvider for MoralisPortfolioClient {
    async fn get_holdings(&self) -> Result<Holdings, TradingError> {
        let url = format!(
            "{}/account/{}/{}/portfolio",
            self.base_url, self.network, self.wallet_address
        );
        let text = self.get_text(&url).await?;
        let body: PortfolioResponse = serde_json::from_str(&text)?;

        let tokens = body
            .tokens
            .into_iter()
            .map(|t| Token {
                symbol: t.symbol,
                name: t.name,
                address: t.mint,
                chain_id: "solana".to_string(),
                balance: Some(TokenBalance {
                    amount: t.amount.parse().unwrap_or(0.0),
                    usd_value: 0.0,
                    cost_basis_native: 0.0,
                }),
            })
            .collect();

        Ok(Holdings {
            native_balance: body.native_balance.solana.parse().unwrap_or(0.0),
            tokens,
        })
    }

    async fn get_swap_history(&self, token_address: &str) -> Result<Vec<SwapTransaction>, TradingError> {
        let url = format!(
            "{}/account/{}/{}/swaps?order=DESC&tokenAddress={}",
            self.base_url, self.network, self.wallet_address, token_address
        );
        let text = self.get_text(&url).await?;
        let body: SwapHistoryResponse = serde_json::from_str(&text)?;
        Ok(body.result)
    }
}

struct CachedHoldings {
    holdings: Option<Holdings>,
    last_fetch: Option<Instant>,
}

/// Holdings with a short-lived cache, enriched with cost basis.
#[derive(Clone)]
pub struct PortfolioService {
    provider: Arc<dyn PortfolioProvider>,
    cache: Arc<RwLock<CachedHoldings>>,
    refresh_interval: Duration,
}

impl PortfolioService {
    pub fn new(provider: Arc<dyn PortfolioProvider>, refresh_interval: Duration) -> Self {
        Self {
            provider,
            cache: Arc::new(RwLock::new(CachedHoldings {
                holdings: None,
                last_fetch: None,
            })),
            refresh_interval,
        }
    }

    pub async fn holdings(&self) -> Result<Holdings, TradingError> {
        {
            let cache = self.cache.read().await;
            if let (Some(h), Some(t)) = (&cache.holdings, cache.last_fetch) {
                if t.elapsed() < self.refresh_interval {
                    return Ok(h.clone());
                }
            }
        }

        let holdings = self.provider.get_holdings().await?;
        let mut cache = self.cache.write().await;
        cache.holdings = Some(holdings.clone());
        cache.last_fetch = Some(Instant::now());
        Ok(holdings)
    }

    /// Cost basis for one token; failures read as zero.
    pub async fn cost_basis(&self, token_address: &str) -> f64 {
        match self.provider.get_swap_history(token_address).await {
            Ok(swaps) => average_cost_basis(&swaps, token_address),
            Err(e) => {
                warn!("[PORTFOLIO] Failed to calculate cost basis for {}: {}", token_address, e);
                0.0
            }
        }
    }

    /// Held tokens with cost basis, looked up concurrently. Empty on failure.
    pub async fn held_tokens(&self) -> Vec<Token> {
        match self.try_held_tokens().await {
            Ok(tokens) => tokens,
            Err(e) => {
                error!("[PORTFOLIO] Failed to fetch portfolio: {}", e);
                Vec::new()
            }
        }
    }

    /// Held tokens with cost basis. Only the holdings lookup can fail.
    pub async fn try_held_tokens(&self) -> Result<Vec<Token>, TradingError> {
        let holdings = self.holdings().await?;

        let tokens = join_all(holdings.tokens.into_iter().map(|mut token| async move {
            let basis = self.cost_basis(&token.address).await;
            if let Some(balance) = token.balance.as_mut() {
                balance.cost_basis_native = basis;
            }
            token
        }))
        .await;

        info!(
            "[PORTFOLIO] {} held tokens, native balance {:.4}",
            tokens.len(),
            holdings.native_balance
        );
        Ok(tokens)
    }
}
