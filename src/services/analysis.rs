use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::data::dexscreener::MarketDataProvider;
use crate::data::signal::SignalClient;
use crate::data::types::{MarketPair, ScoredSocialItem, Token};
use crate::models::{PositionAnalysis, TokenAnalysis};
use crate::services::scoring::market_score;

/// Search query used to find social chatter about a token.
pub fn social_query(token: &Token) -> String {
    format!("{0} ${0}", token.symbol)
}

/// Price, ROI and unrealized P&L of a held token against the freshest pair.
///
/// A zero cost basis falls back to the current price, so such positions read 0% ROI.
pub fn position_analysis(token: &Token, pairs: &[MarketPair]) -> PositionAnalysis {
    let (balance, pair) = match (token.balance.as_ref(), pairs.first()) {
        (Some(balance), Some(pair)) if balance.amount > 0.0 => (balance, pair),
        _ => return PositionAnalysis::default(),
    };

    let price_native = pair.price_native();
    let cost_basis = if balance.cost_basis_native > 0.0 {
        balance.cost_basis_native
    } else {
        price_native
    };
    let roi_native = if cost_basis > 0.0 {
        (price_native / cost_basis - 1.0) * 100.0
    } else {
        0.0
    };

    PositionAnalysis {
        current_price_native: price_native,
        current_price_usd: pair.price_usd(),
        roi_native,
        unrealized_pnl_native: (price_native - cost_basis) * balance.amount,
        has_position: true,
    }
}

/// Gathers market, social and position data for one token.
pub struct TokenAnalyzer {
    market: Arc<dyn MarketDataProvider>,
    /// `None` when no social provider is configured
    signals: Option<SignalClient>,
    social_results: usize,
}

impl TokenAnalyzer {
    pub fn new(market: Arc<dyn MarketDataProvider>, signals: Option<SignalClient>, social_results: usize) -> Self {
        Self {
            market,
            signals,
            social_results,
        }
    }

    pub async fn analyze(&self, token: &Token) -> TokenAnalysis {
        self.analyze_at(token, Utc::now()).await
    }

    pub async fn analyze_at(&self, token: &Token, now: DateTime<Utc>) -> TokenAnalysis {
        let (pairs, social) = tokio::join!(
            self.market.get_pairs(&token.address, &token.chain_id),
            self.social(token)
        );

        let score = pairs.first().map(|pair| market_score(pair, now));
        let market: Vec<MarketPair> = pairs.iter().map(|pair| pair.without_immature_stats(now)).collect();
        let position = position_analysis(token, &market);

        info!(
            "📊 [ANALYSIS] {}: {} pairs, {} social items, score {:?}",
            token.symbol,
            market.len(),
            social.len(),
            score
        );

        TokenAnalysis {
            market,
            social,
            position,
            market_score: score,
        }
    }

    async fn social(&self, token: &Token) -> Vec<ScoredSocialItem> {
        let Some(signals) = self.signals.as_ref() else {
            return Vec::new();
        };
        match signals.search(&social_query(token), self.social_results).await {
            Ok(items) => items,
            Err(e) => {
                warn!("⚠️ [ANALYSIS] Social search failed for {}: {}", token.symbol, e);
                Vec::new()
            }
        }
    }
}
