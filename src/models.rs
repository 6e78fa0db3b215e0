//! Records flowing between the analysis, decision and execution stages.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::types::{MarketPair, ScoredSocialItem, Token};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recommendation::Buy => "BUY",
            Recommendation::Sell => "SELL",
            Recommendation::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// Structured output of the reasoning capability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub recommendation: Recommendation,
    /// 0..=100
    pub confidence: f64,
    pub reasoning: String,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
}

/// Derived every pass from the freshest pair and the token's cost basis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionAnalysis {
    pub current_price_native: f64,
    pub current_price_usd: f64,
    pub roi_native: f64,
    pub unrealized_pnl_native: f64,
    pub has_position: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenAnalysis {
    /// Pairs with immature statistics removed, freshest first
    pub market: Vec<MarketPair>,
    pub social: Vec<ScoredSocialItem>,
    pub position: PositionAnalysis,
    /// Score of the primary pair, if any
    pub market_score: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub action: Recommendation,
    pub error: Option<String>,
    pub amount: Option<f64>,
    /// Venue transaction reference
    pub signature: Option<String>,
    pub token: Token,
    pub decision: Option<TradeDecision>,
    pub market_data: Vec<MarketPair>,
}

impl ExecutionResult {
    pub fn succeeded(action: Recommendation, token: &Token, decision: &TradeDecision, market: &[MarketPair]) -> Self {
        Self {
            success: true,
            action,
            error: None,
            amount: None,
            signature: None,
            token: token.clone(),
            decision: Some(decision.clone()),
            market_data: market.to_vec(),
        }
    }

    pub fn failed(action: Recommendation, error: String, token: &Token, decision: Option<&TradeDecision>, market: &[MarketPair]) -> Self {
        Self {
            success: false,
            action,
            error: Some(error),
            amount: None,
            signature: None,
            token: token.clone(),
            decision: decision.cloned(),
            market_data: market.to_vec(),
        }
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.error = Some(note.to_string());
        self
    }

    pub fn with_fill(mut self, amount: f64, signature: String) -> Self {
        self.amount = Some(amount);
        self.signature = Some(signature);
        self
    }
}
