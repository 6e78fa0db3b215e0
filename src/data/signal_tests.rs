//! Unit tests for the social signal client: caching, pacing and batching.

#[cfg(test)]
mod signal_tests {
    use crate::config::SocialConfig;
    use crate::data::cookie::{SearchRequest, SocialSearchApi};
    use crate::data::signal::{enrich, relative_age, RequestPacer, SignalClient};
    use crate::data::types::SocialItem;
    use crate::error::TradingError;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<(String, Instant)>>,
    }

    impl RecordingApi {
        fn calls(&self) -> Vec<(String, Instant)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SocialSearchApi for RecordingApi {
        async fn search(&self, request: &SearchRequest) -> Result<Vec<SocialItem>, TradingError> {
            self.calls
                .lock()
                .unwrap()
                .push((request.query.clone(), Instant::now()));
            if request.query == "bad" {
                return Err(TradingError::remote("social search", "upstream exploded"));
            }
            Ok(vec![item(&request.query)])
        }
    }

    fn item(text: &str) -> SocialItem {
        SocialItem {
            author_username: "trader".to_string(),
            created_at: Utc::now() - ChronoDuration::minutes(5),
            text: text.to_string(),
            likes_count: 2,
            replies_count: 1,
            retweets_count: 0,
            quotes_count: 0,
            smart_engagement_points: 0.0,
            engagements_count: 0,
            impressions_count: 0,
            is_quote: false,
            is_reply: false,
            matching_score: 0.0,
        }
    }

    /// 1s between requests, batches of three, each batch spends a full minute of budget.
    fn test_config() -> SocialConfig {
        SocialConfig {
            requests_per_minute: 60,
            request_weight: 20,
            max_batch_size: 3,
            batch_delay_secs: 20,
            ..SocialConfig::default()
        }
    }

    fn client(api: Arc<RecordingApi>) -> SignalClient {
        SignalClient::new(api, test_config())
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_skips_upstream() {
        let api = Arc::new(RecordingApi::default());
        let client = client(api.clone());

        let first = client.search("SOL $SOL", 10).await.unwrap();
        let second = client.search("SOL $SOL", 10).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(api.calls().len(), 1);
        assert_eq!(client.cached_queries(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expires_after_ttl() {
        let api = Arc::new(RecordingApi::default());
        let client = client(api.clone());

        client.search("SOL $SOL", 10).await.unwrap();
        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        client.search("SOL $SOL", 10).await.unwrap();

        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_fetch_once() {
        let api = Arc::new(RecordingApi::default());
        let client = client(api.clone());

        let (a, b) = tokio::join!(client.search("WIF $WIF", 10), client.search("WIF $WIF", 10));

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_are_paced() {
        let api = Arc::new(RecordingApi::default());
        let client = client(api.clone());
        let start = Instant::now();

        for q in ["a", "b", "c", "d", "e"] {
            client.search(q, 10).await.unwrap();
        }

        let calls = api.calls();
        assert_eq!(calls.len(), 5);
        assert!(start.elapsed() >= Duration::from_secs(4));
        for pair in calls.windows(2) {
            assert!(pair[1].1.duration_since(pair[0].1) >= Duration::from_secs(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacer_reserves_distinct_slots() {
        let pacer = RequestPacer::per_minute(30);
        assert_eq!(pacer.min_interval(), Duration::from_secs(2));

        let start = Instant::now();
        tokio::join!(pacer.wait_turn(), pacer.wait_turn(), pacer.wait_turn());

        assert!(start.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_many_batches_in_order() {
        let api = Arc::new(RecordingApi::default());
        let client = client(api.clone());
        assert_eq!(client.batch_size(), 3);

        let start = Instant::now();
        let queries: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let results = client.search_many(&queries, 10).await.unwrap();

        let texts: Vec<&str> = results.iter().map(|r| r.item.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);

        let calls = api.calls();
        let d_call = calls.iter().find(|(q, _)| q == "d").map(|(_, t)| *t).unwrap();
        assert!(d_call.duration_since(start) >= Duration::from_secs(20));
        for (q, t) in calls.iter().filter(|(q, _)| q != "d") {
            assert!(t.duration_since(start) < Duration::from_secs(20), "{} ran late", q);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_many_stays_within_weighted_budget() {
        let api = Arc::new(RecordingApi::default());
        let client = client(api.clone());
        let config = test_config();
        let budget = config.requests_per_minute as usize;
        let weight = config.request_weight as usize;

        let queries: Vec<String> = (0..9).map(|i| format!("q{}", i)).collect();
        client.search_many(&queries, 10).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 9);
        for (_, window_start) in &calls {
            let in_window = calls
                .iter()
                .filter(|(_, t)| *t >= *window_start && t.duration_since(*window_start) < Duration::from_secs(60))
                .count();
            assert!(in_window * weight <= budget, "{} weighted units in one minute", in_window * weight);
        }
    }

    #[test]
    fn test_batch_interval_covers_weighted_cost() {
        let client = client(Arc::new(RecordingApi::default()));
        assert_eq!(client.batch_interval(3), Duration::from_secs(60));
        assert_eq!(client.batch_interval(1), Duration::from_secs(20));

        // Defaults: one search of weight 12 against 10 per minute
        let client = SignalClient::new(Arc::new(RecordingApi::default()), SocialConfig::default());
        assert_eq!(client.batch_interval(1), Duration::from_secs(72));
    }

    #[test]
    fn test_default_batch_size_is_one() {
        let client = SignalClient::new(Arc::new(RecordingApi::default()), SocialConfig::default());
        assert_eq!(client.batch_size(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_error_propagates() {
        let api = Arc::new(RecordingApi::default());
        let client = client(api.clone());

        let err = client.search("bad", 10).await.unwrap_err();
        assert!(matches!(err, TradingError::Remote { .. }));
        assert_eq!(client.cached_queries(), 0);

        let queries = vec!["good".to_string(), "bad".to_string()];
        assert!(client.search_many(&queries, 10).await.is_err());
    }

    #[test]
    fn test_relative_age() {
        let now = Utc::now();
        assert_eq!(relative_age(now - ChronoDuration::seconds(30), now), "just now");
        assert_eq!(relative_age(now - ChronoDuration::minutes(5), now), "5m ago");
        assert_eq!(relative_age(now - ChronoDuration::hours(3), now), "3h ago");
        assert_eq!(relative_age(now - ChronoDuration::days(2), now), "2d ago");
    }

    #[test]
    fn test_enrich_derives_fields() {
        let mut raw = item("line one\nline two");
        raw.likes_count = 4;
        raw.quotes_count = 1;
        let scored = enrich(raw, Utc::now());

        assert_eq!(scored.single_line_text, "line one line two");
        assert_eq!(scored.score, 4.0 + 3.0 + 10.0);
        assert_eq!(scored.relative_age, "5m ago");
        assert!(scored.engagement_summary.contains("👍 4"));
    }
}
