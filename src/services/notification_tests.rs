//! Unit tests for trade announcements: filtering, dedup and risk levels.

#[cfg(test)]
mod notification_tests {
    use crate::data::types::{Liquidity, MarketPair, PairToken, PeriodValues, Token};
    use crate::error::{GenerationError, TradingError};
    use crate::llm::TextGenerator;
    use crate::models::{ExecutionResult, Recommendation, TradeDecision};
    use crate::services::notification::{risk_level, PostSink, RiskLevel, TradeAlert, TradeAnnouncer};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct EchoWriter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for EchoWriter {
        async fn generate(&self, _system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let token = prompt
                .lines()
                .find_map(|l| l.strip_prefix("Token: "))
                .unwrap_or("???");
            Ok(format!("  Aping into ${}, vibes are good. DYOR  ", token))
        }
    }

    /// Fails the first `failures` posts.
    #[derive(Default)]
    struct RecordingSink {
        failures: usize,
        attempts: AtomicUsize,
        posts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PostSink for RecordingSink {
        async fn post(&self, text: &str) -> Result<(), TradingError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                return Err(TradingError::remote("twitter", "HTTP 503"));
            }
            self.posts.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn announcer(sink: Arc<RecordingSink>) -> TradeAnnouncer {
        TradeAnnouncer::new(Arc::new(EchoWriter { calls: AtomicUsize::new(0) }), sink)
    }

    fn pair(price_change_24h: f64, liquidity_usd: f64) -> MarketPair {
        MarketPair {
            chain_id: "solana".to_string(),
            dex_id: "raydium".to_string(),
            url: String::new(),
            pair_address: "PairAddr".to_string(),
            base_token: PairToken::default(),
            quote_token: PairToken::default(),
            price_native: "0.01".to_string(),
            price_usd: Some("1.5".to_string()),
            txns: PeriodValues::default(),
            volume: PeriodValues::default(),
            price_change: PeriodValues {
                h24: Some(price_change_24h),
                ..PeriodValues::default()
            },
            liquidity: Some(Liquidity {
                usd: liquidity_usd,
                ..Liquidity::default()
            }),
            fdv: None,
            market_cap: None,
            pair_created_at: None,
        }
    }

    fn result(symbol: &str, action: Recommendation, reasoning: &str) -> ExecutionResult {
        let token = Token::new(symbol, symbol, &format!("{}Mint", symbol), "solana");
        let decision = TradeDecision {
            recommendation: action,
            confidence: 90.0,
            reasoning: reasoning.to_string(),
            risks: vec!["volatility".to_string()],
            opportunities: vec!["momentum".to_string()],
        };
        ExecutionResult::succeeded(action, &token, &decision, &[pair(5.0, 50_000.0)])
    }

    // ============= Risk level =============

    #[test]
    fn test_risk_level_counts_factors() {
        assert_eq!(risk_level(5.0, 50_000.0, 0.9), RiskLevel::Low);
        assert_eq!(risk_level(-25.0, 50_000.0, 0.9), RiskLevel::Medium);
        assert_eq!(risk_level(5.0, 5_000.0, 0.9), RiskLevel::Medium);
        assert_eq!(risk_level(5.0, 50_000.0, 0.5), RiskLevel::Medium);
        assert_eq!(risk_level(25.0, 5_000.0, 0.9), RiskLevel::High);
        assert_eq!(risk_level(25.0, 5_000.0, 0.1), RiskLevel::High);
        assert_eq!(RiskLevel::Medium.to_string(), "MEDIUM");
    }

    // ============= Alert filtering =============

    #[test]
    fn test_alert_requires_filled_trade_with_market_data() {
        assert!(TradeAlert::from_result(&result("WIF", Recommendation::Buy, "x")).is_some());
        assert!(TradeAlert::from_result(&result("WIF", Recommendation::Hold, "x")).is_none());

        let mut failed = result("WIF", Recommendation::Buy, "x");
        failed.success = false;
        assert!(TradeAlert::from_result(&failed).is_none());

        let mut no_market = result("WIF", Recommendation::Buy, "x");
        no_market.market_data.clear();
        assert!(TradeAlert::from_result(&no_market).is_none());
    }

    #[test]
    fn test_alert_fields() {
        let alert = TradeAlert::from_result(&result("WIF", Recommendation::Buy, "breakout")).unwrap();
        assert_eq!(alert.dedup_key(), "WIF-BUY");
        assert_eq!(alert.confidence, 0.9);
        assert_eq!(alert.price_usd, 1.5);
        assert_eq!(alert.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_loss_exits_detected() {
        let stop = TradeAlert::from_result(&result("WIF", Recommendation::Sell, "Hit the Stop Loss")).unwrap();
        assert!(stop.is_loss_exit());
        let profit = TradeAlert::from_result(&result("WIF", Recommendation::Sell, "taking profits")).unwrap();
        assert!(!profit.is_loss_exit());
        // Only sells are suppressed
        let buy = TradeAlert::from_result(&result("WIF", Recommendation::Buy, "no loss in sight")).unwrap();
        assert!(!buy.is_loss_exit());
    }

    // ============= Announcer =============

    #[tokio::test]
    async fn test_notify_posts_once_per_symbol_action() {
        let sink = Arc::new(RecordingSink::default());
        let announcer = announcer(sink.clone());

        let batch = vec![
            result("WIF", Recommendation::Buy, "breakout"),
            result("WIF", Recommendation::Buy, "still breaking out"),
            result("BONK", Recommendation::Sell, "cutting losses"),
            result("POPCAT", Recommendation::Hold, "wait"),
            result("MEW", Recommendation::Sell, "taking profits"),
        ];
        assert_eq!(announcer.notify_successful_trades(&batch).await, 2);
        assert_eq!(
            sink.posts.lock().unwrap().clone(),
            vec![
                "Aping into $WIF, vibes are good. DYOR".to_string(),
                "Aping into $MEW, vibes are good. DYOR".to_string(),
            ]
        );

        // Already announced keys stay quiet on later iterations
        assert_eq!(announcer.notify_successful_trades(&batch).await, 0);
        assert!(announcer.was_announced("WIF-BUY"));
        assert!(announcer.was_announced("MEW-SELL"));
        assert!(!announcer.was_announced("BONK-SELL"));
    }

    #[tokio::test]
    async fn test_failed_post_is_retried_next_time() {
        let sink = Arc::new(RecordingSink {
            failures: 1,
            ..RecordingSink::default()
        });
        let announcer = announcer(sink.clone());
        let batch = vec![result("WIF", Recommendation::Buy, "breakout")];

        assert_eq!(announcer.notify_successful_trades(&batch).await, 0);
        assert!(!announcer.was_announced("WIF-BUY"));

        assert_eq!(announcer.notify_successful_trades(&batch).await, 1);
        assert!(announcer.was_announced("WIF-BUY"));
    }
}
