//! Solana swaps through the Jupiter aggregator, signed locally and sent over JSON-RPC.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::VersionedTransaction;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::SolanaConfig;
use crate::constants::{execution, tokens};
use crate::error::{classify_venue_failure, TradingError};

use super::traits::{SwapVenue, VenueResult};
use super::types::{Chain, StakeReceipt, SwapReceipt, SwapRequest};

const NATIVE_SYMBOL: &str = "SOL";
const SOL_DECIMALS: u8 = 9;

/// Decode a base58 keypair (64 bytes: secret then public).
pub fn keypair_from_base58(encoded: &str) -> Result<Keypair, TradingError> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| TradingError::Config(format!("invalid base58 private key: {}", e)))?;
    Keypair::try_from(bytes.as_slice())
        .map_err(|e| TradingError::Config(format!("invalid keypair bytes: {}", e)))
}

/// Human amount to integer base units.
pub fn to_base_units(amount: f64, decimals: u8) -> u64 {
    (amount * 10f64.powi(decimals as i32)).round().max(0.0) as u64
}

/// Decimals for reporting an output amount. Falls back to the native decimals with a warning.
pub fn decimals_or_native(lookup: VenueResult<u8>, mint: &str) -> u8 {
    match lookup {
        Ok(decimals) => decimals,
        Err(e) => {
            warn!(
                "⚠️ [SOLANA] Decimals lookup for {} failed ({}), reporting output with {} decimals",
                mint, e, SOL_DECIMALS
            );
            SOL_DECIMALS
        }
    }
}

pub fn from_base_units(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

#[derive(Deserialize, Debug)]
struct RpcErrorData {
    #[serde(default)]
    logs: Option<Vec<String>>,
}

#[derive(Deserialize, Debug)]
struct RpcError {
    message: String,
    #[serde(default)]
    data: Option<RpcErrorData>,
}

#[derive(Deserialize, Debug)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize, Debug)]
struct TokenSupplyValue {
    decimals: u8,
}

#[derive(Deserialize, Debug)]
struct TokenSupply {
    value: TokenSupplyValue,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JupiterSwapResponse {
    swap_transaction: String,
}

pub struct SolanaVenue {
    client: Client,
    rpc_url: String,
    jupiter_url: String,
    keypair: Arc<Keypair>,
}

impl SolanaVenue {
    pub fn new(config: &SolanaConfig) -> Result<Self, TradingError> {
        let private_key = config
            .private_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| TradingError::Config("Solana private key is not set".to_string()))?;
        let rpc_url = config
            .rpc_url
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| TradingError::Config("Solana RPC url is not set".to_string()))?;

        Ok(Self {
            client: Client::new(),
            rpc_url,
            jupiter_url: config.jupiter_url.trim_end_matches('/').to_string(),
            keypair: Arc::new(keypair_from_base58(private_key)?),
        })
    }

    pub fn public_key(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    fn resolve_mint(token: &str) -> &str {
        if token.eq_ignore_ascii_case(NATIVE_SYMBOL) {
            tokens::SOL_MINT
        } else {
            token
        }
    }

    async fn rpc<T: DeserializeOwned>(&self, method: &str, params: Value) -> VenueResult<T> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let resp = self.client.post(&self.rpc_url).json(&body).send().await?;
        let text = resp.text().await?;
        let parsed: RpcResponse<T> = serde_json::from_str(&text)
            .map_err(|e| TradingError::Parse(format!("{} response decode failed: {}", method, e)))?;

        if let Some(err) = parsed.error {
            let mut diagnostics = err.data.and_then(|d| d.logs).unwrap_or_default();
            if !diagnostics.is_empty() {
                error!("[SOLANA] {} failed. Full logs: {:?}", method, diagnostics);
            }
            diagnostics.push(err.message.clone());
            return Err(classify_venue_failure(&diagnostics).unwrap_or(TradingError::Venue(err.message)));
        }

        parsed
            .result
            .ok_or_else(|| TradingError::Venue(format!("{} returned no result", method)))
    }

    async fn mint_decimals(&self, mint: &str) -> VenueResult<u8> {
        if mint == tokens::SOL_MINT {
            return Ok(SOL_DECIMALS);
        }
        let supply: TokenSupply = self.rpc("getTokenSupply", json!([mint])).await?;
        Ok(supply.value.decimals)
    }

    async fn quote(&self, input_mint: &str, output_mint: &str, amount: u64, slippage_bps: u16) -> VenueResult<Value> {
        let url = format!("{}/quote", self.jupiter_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("inputMint", input_mint.to_string()),
                ("outputMint", output_mint.to_string()),
                ("amount", amount.to_string()),
                ("slippageBps", slippage_bps.to_string()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(classify_venue_failure(&[text.as_str()])
                .unwrap_or_else(|| TradingError::remote("jupiter quote", format!("HTTP {}: {}", status, text))));
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn swap_transaction(&self, quote: Value) -> VenueResult<String> {
        let url = format!("{}/swap", self.jupiter_url);
        let body = json!({
            "userPublicKey": self.public_key(),
            "quoteResponse": quote,
            "wrapAndUnwrapSol": true,
            "dynamicComputeUnitLimit": true,
        });
        let resp = self.client.post(&url).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(TradingError::remote("jupiter swap", format!("HTTP {}: {}", status, text)));
        }
        let parsed: JupiterSwapResponse = serde_json::from_str(&text)?;
        Ok(parsed.swap_transaction)
    }

    /// Re-sign the aggregator's unsigned transaction with the wallet keypair.
    fn sign(&self, unsigned_b64: &str) -> VenueResult<String> {
        let engine = base64::engine::general_purpose::STANDARD;
        let bytes = engine
            .decode(unsigned_b64)
            .map_err(|e| TradingError::Parse(format!("swap transaction is not base64: {}", e)))?;
        let unsigned: VersionedTransaction = bincode::deserialize(&bytes)
            .map_err(|e| TradingError::Parse(format!("swap transaction decode failed: {}", e)))?;
        let signed = VersionedTransaction::try_new(unsigned.message, &[self.keypair.as_ref()])
            .map_err(|e| TradingError::Venue(format!("signing failed: {}", e)))?;
        let wire = bincode::serialize(&signed)
            .map_err(|e| TradingError::Parse(format!("swap transaction encode failed: {}", e)))?;
        Ok(engine.encode(wire))
    }

    async fn send(&self, signed_b64: String) -> VenueResult<String> {
        self.rpc(
            "sendTransaction",
            json!([signed_b64, {"encoding": "base64", "preflightCommitment": "confirmed"}]),
        )
        .await
    }
}

#[async_trait]
impl SwapVenue for SolanaVenue {
    fn name(&self) -> &'static str {
        "solana-jupiter"
    }

    fn chain(&self) -> Chain {
        Chain::Solana
    }

    fn native_symbol(&self) -> &'static str {
        NATIVE_SYMBOL
    }

    async fn swap(&self, request: SwapRequest) -> VenueResult<SwapReceipt> {
        let input_mint = Self::resolve_mint(&request.from_token).to_string();
        let output_mint = Self::resolve_mint(&request.to_token).to_string();
        let slippage_bps = request.slippage_bps();

        info!(
            "🔄 [SOLANA] Executing swap {} -> {} (amount: {}, slippageBps: {})",
            input_mint, output_mint, request.amount, slippage_bps
        );

        let in_decimals = self.mint_decimals(&input_mint).await?;
        let raw_amount = to_base_units(request.amount, in_decimals);
        if raw_amount == 0 {
            return Err(TradingError::Venue(format!("swap amount {} rounds to zero", request.amount)));
        }

        let quote = self.quote(&input_mint, &output_mint, raw_amount, slippage_bps).await?;
        let out_raw = quote
            .get("outAmount")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);
        debug!("[SOLANA] Quote outAmount (raw): {}", out_raw);

        let unsigned = self.swap_transaction(quote).await?;
        let signed = self.sign(&unsigned)?;
        let signature = self.send(signed).await?;

        // The swap has landed, so a failed lookup only affects the reported amount
        let out_decimals = decimals_or_native(self.mint_decimals(&output_mint).await, &output_mint);
        info!("✅ [SOLANA] Swap successful: {}", signature);

        Ok(SwapReceipt {
            signature,
            from_amount: request.amount,
            to_amount: from_base_units(out_raw, out_decimals),
        })
    }

    /// SOL into jupSOL via the aggregator.
    async fn stake(&self, amount: f64) -> VenueResult<StakeReceipt> {
        if amount < execution::MIN_STAKE_AMOUNT {
            return Err(TradingError::Venue(format!(
                "Minimum staking amount is {} SOL",
                execution::MIN_STAKE_AMOUNT
            )));
        }

        let request = SwapRequest::new(NATIVE_SYMBOL, tokens::JUPSOL_MINT, amount)
            .with_slippage(execution::INITIAL_SLIPPAGE);
        let receipt = self.swap(request).await?;

        info!("🥩 [SOLANA] Staked {} SOL for {} jupSOL", amount, receipt.to_amount);
        Ok(StakeReceipt {
            signature: receipt.signature,
            amount,
            received_amount: receipt.to_amount,
        })
    }
}
