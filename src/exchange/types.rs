use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TradingError;

/// Chains with a swap venue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Solana,
    Base,
}

impl Chain {
    /// Chain ids as reported by the market data provider.
    pub fn parse(chain_id: &str) -> Result<Self, TradingError> {
        match chain_id.trim().to_lowercase().as_str() {
            "solana" => Ok(Chain::Solana),
            "base" => Ok(Chain::Base),
            _ => Err(TradingError::UnsupportedChain {
                chain: chain_id.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Solana => "solana",
            Chain::Base => "base",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Token address, or the venue's native symbol
    pub from_token: String,
    pub to_token: String,
    /// Human units of `from_token`
    pub amount: f64,
    /// Percent
    pub slippage: f64,
}

impl SwapRequest {
    pub fn new(from_token: &str, to_token: &str, amount: f64) -> Self {
        Self {
            from_token: from_token.to_string(),
            to_token: to_token.to_string(),
            amount,
            slippage: 0.0,
        }
    }

    pub fn with_slippage(&self, slippage: f64) -> Self {
        Self {
            slippage,
            ..self.clone()
        }
    }

    /// Slippage in basis points, truncated.
    pub fn slippage_bps(&self) -> u16 {
        (self.slippage * 100.0).floor().clamp(0.0, u16::MAX as f64) as u16
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub signature: String,
    pub from_amount: f64,
    pub to_amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakeReceipt {
    pub signature: String,
    pub amount: f64,
    /// Liquid staking tokens received
    pub received_amount: f64,
}
