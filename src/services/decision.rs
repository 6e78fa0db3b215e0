use std::sync::Arc;
use tracing::{error, info, warn};

use crate::agents::{Agent, TradeAnalystAgent};
use crate::constants::events;
use crate::data::types::{MarketPair, Token};
use crate::models::{Recommendation, TokenAnalysis, TradeDecision};
use crate::llm::TextGenerator;

/// Only BUY opens a position and only SELL or HOLD applies to one that is held.
pub fn enforce_position_rules(mut decision: TradeDecision, has_position: bool) -> TradeDecision {
    let coerced = match (has_position, decision.recommendation) {
        (true, Recommendation::Buy) => Some(Recommendation::Hold),
        (false, Recommendation::Sell | Recommendation::Hold) => Some(Recommendation::Buy),
        _ => None,
    };

    if let Some(replacement) = coerced {
        warn!(
            event = events::DECISION_COERCED,
            "⚠️ [DECISION] {} is invalid {} a position, using {}",
            decision.recommendation,
            if has_position { "with" } else { "without" },
            replacement
        );
        decision.recommendation = replacement;
    }
    decision
}

fn position_section(token: &Token, analysis: &TokenAnalysis) -> String {
    let Some(balance) = token.balance.as_ref().filter(|_| analysis.position.has_position) else {
        return String::new();
    };
    let position = &analysis.position;
    format!(
        "\nCurrent Position Details:\n\
         - ROI: {:.2}% in SOL\n\
         - Unrealized P&L: {:.4} SOL\n\
         - Current Price: {:.8} SOL\n\
         - Position Size: {} {}",
        position.roi_native, position.unrealized_pnl_native, position.current_price_native, balance.amount, token.symbol
    )
}

/// The analyst prompt for one token. `primary` is the freshest pair.
pub fn build_prompt(token: &Token, analysis: &TokenAnalysis, primary: &MarketPair) -> String {
    let has_position = analysis.position.has_position;

    let note = if has_position {
        format!(
            "Note: We already own this token. Consider the current ROI of {:.2}% when deciding between SELL or HOLD.",
            analysis.position.roi_native
        )
    } else {
        "Note: We don't own this token yet, so only BUY is possible.".to_string()
    };
    let allowed = if has_position { r#""SELL" | "HOLD""# } else { r#""BUY""# };

    let market = serde_json::to_string_pretty(primary).unwrap_or_default();
    let recent: Vec<_> = analysis.social.iter().take(3).collect();
    let recent = serde_json::to_string_pretty(&recent).unwrap_or_default();
    let score = analysis
        .market_score
        .map(|s| format!("{:.1}/100", s))
        .unwrap_or_else(|| "n/a".to_string());

    let guidelines = if has_position {
        "- Consider taking profits (SELL) if ROI > 100%\n\
         - Consider cutting losses (SELL) if ROI < -50%\n\
         - You must SELL everything if the price is down > 90%\n\
         - Consider holding (HOLD) if momentum is positive despite negative ROI\n\
         - Evaluate recent price action and social sentiment"
    } else {
        "- Look for strong upward price momentum\n\
         - Consider social sentiment and trading volume\n\
         - Evaluate market cap and liquidity"
    };

    format!(
        r#"Analyze the following token data and provide a trading recommendation.
{note}

Return the response as a JSON object with the following structure:
{{
  "recommendation": {allowed},
  "confidence": number (0-100),
  "reasoning": string explaining the decision,
  "risks": array of potential risks,
  "opportunities": array of potential opportunities
}}

Analysis Data:
Token: {symbol}{position}

Market Analysis:
{market}

Market Score: {score}

Social Analysis:
- Tweet Count: {count}
- Recent Social Activity: {recent}

Trading Guidelines:
{guidelines}"#,
        symbol = token.symbol,
        position = position_section(token, analysis),
        count = analysis.social.len(),
    )
}

/// Asks the analyst for a decision and validates it.
pub struct DecisionMaker {
    generator: Arc<dyn TextGenerator>,
    agent: TradeAnalystAgent,
}

impl DecisionMaker {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            agent: TradeAnalystAgent,
        }
    }

    /// `None` when there is nothing to decide on or the answer is unusable.
    pub async fn decide(&self, token: &Token, analysis: &TokenAnalysis) -> Option<TradeDecision> {
        let Some(primary) = analysis.market.first() else {
            warn!("⚠️ [DECISION] No market data available for {}", token.symbol);
            return None;
        };

        let prompt = build_prompt(token, analysis, primary);
        let decision: TradeDecision = match self.agent.run_object(&prompt, self.generator.as_ref()).await {
            Ok(decision) => decision,
            Err(e) => {
                error!("❌ [DECISION] Decision making failed for {}: {}", token.symbol, e);
                return None;
            }
        };

        if !(0.0..=100.0).contains(&decision.confidence) {
            error!(
                "❌ [DECISION] Confidence {} out of range for {}",
                decision.confidence, token.symbol
            );
            return None;
        }

        let decision = enforce_position_rules(decision, analysis.position.has_position);
        info!(
            "🧠 [DECISION] {}: {} (confidence {:.0}) - {}",
            token.symbol, decision.recommendation, decision.confidence, decision.reasoning
        );
        Some(decision)
    }
}
