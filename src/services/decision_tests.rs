//! Unit tests for the decision engine: prompt content, validation and position rules.

#[cfg(test)]
mod decision_tests {
    use crate::data::types::{MarketPair, PairToken, PeriodValues, Token, TokenBalance};
    use crate::error::GenerationError;
    use crate::llm::TextGenerator;
    use crate::models::{PositionAnalysis, Recommendation, TokenAnalysis, TradeDecision};
    use crate::services::decision::{build_prompt, enforce_position_rules, DecisionMaker};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Replies with a fixed text and keeps the prompts it saw.
    struct ScriptedGenerator {
        reply: Result<String, GenerationError>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(GenerationError::Request("timeout".to_string())),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn pair() -> MarketPair {
        MarketPair {
            chain_id: "solana".to_string(),
            dex_id: "raydium".to_string(),
            url: String::new(),
            pair_address: "PairAddr".to_string(),
            base_token: PairToken {
                address: "WifMint".to_string(),
                name: "Dog Hat".to_string(),
                symbol: "WIF".to_string(),
            },
            quote_token: PairToken::default(),
            price_native: "0.02".to_string(),
            price_usd: Some("3.10".to_string()),
            txns: PeriodValues::default(),
            volume: PeriodValues::default(),
            price_change: PeriodValues::default(),
            liquidity: None,
            fdv: None,
            market_cap: None,
            pair_created_at: None,
        }
    }

    fn fresh_token() -> Token {
        Token::new("WIF", "Dog Hat", "WifMint", "solana")
    }

    fn held_token() -> Token {
        fresh_token().with_balance(TokenBalance {
            amount: 250.0,
            usd_value: 0.0,
            cost_basis_native: 0.01,
        })
    }

    fn analysis(has_position: bool) -> TokenAnalysis {
        TokenAnalysis {
            market: vec![pair()],
            social: Vec::new(),
            position: PositionAnalysis {
                current_price_native: 0.02,
                current_price_usd: 3.1,
                roi_native: if has_position { 100.0 } else { 0.0 },
                unrealized_pnl_native: if has_position { 2.5 } else { 0.0 },
                has_position,
            },
            market_score: Some(64.0),
        }
    }

    fn decision(recommendation: Recommendation) -> TradeDecision {
        TradeDecision {
            recommendation,
            confidence: 80.0,
            reasoning: "volume rising".to_string(),
            risks: vec![],
            opportunities: vec![],
        }
    }

    // ============= Position rules =============

    #[test]
    fn test_held_token_cannot_be_bought() {
        assert_eq!(enforce_position_rules(decision(Recommendation::Buy), true).recommendation, Recommendation::Hold);
        assert_eq!(enforce_position_rules(decision(Recommendation::Sell), true).recommendation, Recommendation::Sell);
        assert_eq!(enforce_position_rules(decision(Recommendation::Hold), true).recommendation, Recommendation::Hold);
    }

    #[test]
    fn test_unheld_token_can_only_be_bought() {
        assert_eq!(enforce_position_rules(decision(Recommendation::Sell), false).recommendation, Recommendation::Buy);
        assert_eq!(enforce_position_rules(decision(Recommendation::Hold), false).recommendation, Recommendation::Buy);
        assert_eq!(enforce_position_rules(decision(Recommendation::Buy), false).recommendation, Recommendation::Buy);
    }

    #[test]
    fn test_coercion_keeps_confidence_and_reasoning() {
        let coerced = enforce_position_rules(decision(Recommendation::Buy), true);
        assert_eq!(coerced.confidence, 80.0);
        assert_eq!(coerced.reasoning, "volume rising");
    }

    // ============= Prompt =============

    #[test]
    fn test_prompt_for_held_token_includes_position() {
        let prompt = build_prompt(&held_token(), &analysis(true), &pair());
        assert!(prompt.contains("We already own this token"));
        assert!(prompt.contains("ROI: 100.00% in SOL"));
        assert!(prompt.contains("Position Size: 250 WIF"));
        assert!(prompt.contains(r#""recommendation": "SELL" | "HOLD""#));
        assert!(prompt.contains("Consider taking profits (SELL) if ROI > 100%"));
        assert!(prompt.contains("Market Score: 64.0/100"));
        assert!(prompt.contains("\"pairAddress\": \"PairAddr\""));
    }

    #[test]
    fn test_prompt_for_new_token_only_offers_buy() {
        let prompt = build_prompt(&fresh_token(), &analysis(false), &pair());
        assert!(prompt.contains("only BUY is possible"));
        assert!(prompt.contains(r#""recommendation": "BUY""#));
        assert!(!prompt.contains("Current Position Details"));
        assert!(prompt.contains("Tweet Count: 0"));
    }

    // ============= Decide =============

    #[tokio::test]
    async fn test_decide_parses_and_coerces() {
        let generator = ScriptedGenerator::replying(
            r#"{"recommendation": "BUY", "confidence": 88, "reasoning": "strong", "risks": ["rug"], "opportunities": []}"#,
        );
        let maker = DecisionMaker::new(generator.clone());

        let decision = maker.decide(&held_token(), &analysis(true)).await.unwrap();
        assert_eq!(decision.recommendation, Recommendation::Hold);
        assert_eq!(decision.confidence, 88.0);
        assert_eq!(decision.risks, vec!["rug".to_string()]);
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_decide_without_market_data_skips_generation() {
        let generator = ScriptedGenerator::replying("{}");
        let maker = DecisionMaker::new(generator.clone());
        let mut analysis = analysis(false);
        analysis.market.clear();

        assert!(maker.decide(&fresh_token(), &analysis).await.is_none());
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_decide_rejects_bad_output() {
        let maker = DecisionMaker::new(ScriptedGenerator::failing());
        assert!(maker.decide(&fresh_token(), &analysis(false)).await.is_none());

        let maker = DecisionMaker::new(ScriptedGenerator::replying("I'd buy it honestly"));
        assert!(maker.decide(&fresh_token(), &analysis(false)).await.is_none());

        let maker = DecisionMaker::new(ScriptedGenerator::replying(
            r#"{"recommendation": "MOON", "confidence": 50, "reasoning": "x"}"#,
        ));
        assert!(maker.decide(&fresh_token(), &analysis(false)).await.is_none());
    }

    #[tokio::test]
    async fn test_decide_rejects_out_of_range_confidence() {
        let maker = DecisionMaker::new(ScriptedGenerator::replying(
            r#"{"recommendation": "BUY", "confidence": 140, "reasoning": "x", "risks": [], "opportunities": []}"#,
        ));
        assert!(maker.decide(&fresh_token(), &analysis(false)).await.is_none());
    }
}
