//! Unit tests for per-token analysis and position analytics.

#[cfg(test)]
mod analysis_tests {
    use crate::config::SocialConfig;
    use crate::data::cookie::{SearchRequest, SocialSearchApi};
    use crate::data::dexscreener::MarketDataProvider;
    use crate::data::signal::SignalClient;
    use crate::data::types::{MarketPair, PairToken, PeriodValues, SocialItem, Token, TokenBalance};
    use crate::error::TradingError;
    use crate::services::analysis::{position_analysis, social_query, TokenAnalyzer};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
    }

    fn pair(price_native: &str, age: Duration) -> MarketPair {
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
            price_native: price_native.to_string(),
            price_usd: Some("2.50".to_string()),
            txns: PeriodValues::default(),
            volume: PeriodValues {
                m5: Some(100.0),
                h1: Some(1_000.0),
                h6: Some(6_000.0),
                h24: Some(24_000.0),
            },
            price_change: PeriodValues::default(),
            liquidity: None,
            fdv: None,
            market_cap: None,
            pair_created_at: Some((now() - age).timestamp_millis()),
        }
    }

    fn held(amount: f64, cost_basis_native: f64) -> Token {
        Token::new("WIF", "Dog Hat", "WifMint", "solana").with_balance(TokenBalance {
            amount,
            usd_value: 0.0,
            cost_basis_native,
        })
    }

    struct FixedMarket(Vec<MarketPair>);

    #[async_trait]
    impl MarketDataProvider for FixedMarket {
        async fn get_trending(&self, _max_results: usize) -> Vec<Token> {
            Vec::new()
        }

        async fn get_pairs(&self, _address: &str, _chain_id: &str) -> Vec<MarketPair> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct SocialStub {
        fail: bool,
        queries: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl SocialSearchApi for SocialStub {
        async fn search(&self, request: &SearchRequest) -> Result<Vec<SocialItem>, TradingError> {
            self.queries
                .lock()
                .unwrap()
                .push((request.query.clone(), request.max_results));
            if self.fail {
                return Err(TradingError::remote("social search", "HTTP 500"));
            }
            Ok(vec![SocialItem {
                author_username: "degen".to_string(),
                created_at: Utc::now(),
                text: "WIF to the moon".to_string(),
                likes_count: 10,
                replies_count: 1,
                retweets_count: 2,
                quotes_count: 0,
                smart_engagement_points: 0.0,
                engagements_count: 0,
                impressions_count: 0,
                is_quote: false,
                is_reply: false,
                matching_score: 0.0,
            }])
        }
    }

    fn analyzer(pairs: Vec<MarketPair>, social: Option<Arc<SocialStub>>) -> TokenAnalyzer {
        let signals = social.map(|api| SignalClient::new(api, SocialConfig::default()));
        TokenAnalyzer::new(Arc::new(FixedMarket(pairs)), signals, 10)
    }

    // ============= Position analytics =============

    #[test]
    fn test_position_roi_and_pnl() {
        let position = position_analysis(&held(1_000.0, 0.01), &[pair("0.015", Duration::days(2))]);

        assert!(position.has_position);
        assert_eq!(position.current_price_native, 0.015);
        assert_eq!(position.current_price_usd, 2.5);
        assert!((position.roi_native - 50.0).abs() < 1e-9);
        assert!((position.unrealized_pnl_native - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_position_loss() {
        let position = position_analysis(&held(200.0, 0.02), &[pair("0.005", Duration::days(2))]);
        assert!((position.roi_native + 75.0).abs() < 1e-9);
        assert!((position.unrealized_pnl_native + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_cost_basis_reads_flat() {
        let position = position_analysis(&held(500.0, 0.0), &[pair("0.02", Duration::days(2))]);
        assert!(position.has_position);
        assert_eq!(position.roi_native, 0.0);
        assert_eq!(position.unrealized_pnl_native, 0.0);
    }

    #[test]
    fn test_no_position_without_balance_or_pairs() {
        let token = Token::new("WIF", "Dog Hat", "WifMint", "solana");
        assert!(!position_analysis(&token, &[pair("0.02", Duration::days(2))]).has_position);
        assert!(!position_analysis(&held(10.0, 0.01), &[]).has_position);
        assert!(!position_analysis(&held(0.0, 0.01), &[pair("0.02", Duration::days(2))]).has_position);
    }

    // ============= Analyzer =============

    #[test]
    fn test_social_query_uses_cashtag() {
        let token = Token::new("BONK", "Bonk", "BonkMint", "solana");
        assert_eq!(social_query(&token), "BONK $BONK");
    }

    #[tokio::test]
    async fn test_analyze_filters_young_stats_and_scores_raw_pair() {
        let social = Arc::new(SocialStub::default());
        let analyzer = analyzer(vec![pair("0.02", Duration::minutes(90))], Some(social.clone()));

        let analysis = analyzer.analyze_at(&held(10.0, 0.01), now()).await;

        assert_eq!(analysis.market.len(), 1);
        assert!(analysis.market[0].volume.h1.is_some());
        assert!(analysis.market[0].volume.h6.is_none());
        assert!(analysis.market[0].volume.h24.is_none());
        assert!(analysis.market_score.is_some());
        assert!(analysis.position.has_position);
        assert_eq!(analysis.social.len(), 1);
        assert_eq!(
            social.queries.lock().unwrap().clone(),
            vec![("WIF $WIF".to_string(), 10)]
        );
    }

    #[tokio::test]
    async fn test_social_failure_falls_back_to_empty() {
        let social = Arc::new(SocialStub {
            fail: true,
            ..SocialStub::default()
        });
        let analyzer = analyzer(vec![pair("0.02", Duration::days(3))], Some(social));

        let analysis = analyzer.analyze_at(&held(10.0, 0.01), now()).await;
        assert!(analysis.social.is_empty());
        assert_eq!(analysis.market.len(), 1);
    }

    #[tokio::test]
    async fn test_no_pairs_means_no_score() {
        let analyzer = analyzer(Vec::new(), None);
        let analysis = analyzer.analyze_at(&held(10.0, 0.01), now()).await;

        assert!(analysis.market.is_empty());
        assert!(analysis.social.is_empty());
        assert_eq!(analysis.market_score, None);
        assert!(!analysis.position.has_position);
    }
}
