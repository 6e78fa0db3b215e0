//! Base swaps through a custodial wallet provider's trade API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::BaseConfig;
use crate::error::{classify_venue_failure, TradingError};

use super::traits::{SwapVenue, VenueResult};
use super::types::{Chain, SwapReceipt, SwapRequest};

const NATIVE_SYMBOL: &str = "ETH";

#[derive(Serialize, Debug)]
struct TradeRequest<'a> {
    from_asset_id: &'a str,
    to_asset_id: &'a str,
    amount: String,
}

#[derive(Deserialize, Debug, Default)]
struct TradeTransaction {
    #[serde(default)]
    transaction_hash: Option<String>,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize, Debug)]
struct TradeResponse {
    #[serde(default)]
    trade_id: String,
    #[serde(default)]
    from_amount: Option<String>,
    #[serde(default)]
    to_amount: Option<String>,
    #[serde(default)]
    transaction: TradeTransaction,
}

pub struct BaseVenue {
    client: Client,
    api_url: String,
    api_key_name: String,
    api_key: String,
    wallet_address: String,
    network: String,
}

impl BaseVenue {
    pub fn new(config: &BaseConfig) -> Result<Self, TradingError> {
        let missing = |what: &str| TradingError::Config(format!("Base trading not configured: {} missing", what));
        let api_key_name = config
            .api_key_name
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| missing("API key name"))?;
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| missing("API private key"))?;
        let wallet_address = config
            .wallet_address
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| missing("wallet address"))?;

        Ok(Self {
            client: Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key_name,
            api_key,
            wallet_address,
            network: config.network.clone(),
        })
    }

    fn asset_id(token: &str) -> String {
        if token.eq_ignore_ascii_case(NATIVE_SYMBOL) {
            "eth".to_string()
        } else {
            token.to_string()
        }
    }
}

#[async_trait]
impl SwapVenue for BaseVenue {
    fn name(&self) -> &'static str {
        "base-wallet"
    }

    fn chain(&self) -> Chain {
        Chain::Base
    }

    fn native_symbol(&self) -> &'static str {
        NATIVE_SYMBOL
    }

    /// The trade API prices the swap itself; the requested slippage is not forwarded.
    async fn swap(&self, request: SwapRequest) -> VenueResult<SwapReceipt> {
        let url = format!(
            "{}/v1/networks/{}/addresses/{}/trades",
            self.api_url, self.network, self.wallet_address
        );
        let from = Self::asset_id(&request.from_token);
        let to = Self::asset_id(&request.to_token);

        info!(
            "🔄 [BASE] Executing swap {} -> {} (amount: {}, network: {})",
            from, to, request.amount, self.network
        );

        let body = TradeRequest {
            from_asset_id: &from,
            to_asset_id: &to,
            amount: request.amount.to_string(),
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("X-Api-Key-Name", &self.api_key_name)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(classify_venue_failure(&[text.as_str()])
                .unwrap_or_else(|| TradingError::remote("base trade", format!("HTTP {}: {}", status, text))));
        }

        let trade: TradeResponse = serde_json::from_str(&text)?;
        if trade.transaction.status.eq_ignore_ascii_case("failed") {
            return Err(TradingError::Venue(format!("trade {} failed on-chain", trade.trade_id)));
        }

        let signature = trade.transaction.transaction_hash.unwrap_or(trade.trade_id);
        let parse = |v: Option<String>, fallback: f64| v.and_then(|s| s.parse().ok()).unwrap_or(fallback);

        info!("✅ [BASE] Swap successful: {}", signature);
        Ok(SwapReceipt {
            signature,
            from_amount: parse(trade.from_amount, request.amount),
            to_amount: parse(trade.to_amount, 0.0),
        })
    }
}
