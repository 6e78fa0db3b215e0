//! Rate-limited, TTL-cached social signal client.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures_util::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, error, info};

use crate::config::SocialConfig;
use crate::constants::events;
use crate::data::cookie::{SearchRequest, SocialSearchApi};
use crate::data::store::SignalStore;
use crate::data::types::{ScoredSocialItem, SocialItem};
use crate::error::TradingError;
use crate::services::scoring::social_score;

/// Spaces outbound requests at least `min_interval` apart.
/// Callers reserve the next free slot under the lock, then sleep outside it.
#[derive(Clone, Debug)]
pub struct RequestPacer {
    last_slot: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_slot: Arc::new(Mutex::new(None)),
            min_interval,
        }
    }

    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self::new(Duration::from_secs(60) / requests_per_minute.max(1))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub async fn wait_turn(&self) {
        let slot = {
            let mut last = self.last_slot.lock().await;
            let now = Instant::now();
            let slot = match *last {
                Some(prev) => (prev + self.min_interval).max(now),
                None => now,
            };
            *last = Some(slot);
            slot
        };

        let now = Instant::now();
        if slot > now {
            debug!(
                event = events::RATE_LIMITED,
                "[SIGNAL] Pacing request for {}ms",
                (slot - now).as_millis()
            );
            sleep_until(slot).await;
        }
    }
}

/// Human-relative age of a timestamp: "just now", "5m ago", "3h ago", "2d ago".
pub fn relative_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - created_at).num_seconds();
    if secs < 60 {
        "just now".to_string()
    } else if secs < 3_600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3_600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

pub fn enrich(item: SocialItem, now: DateTime<Utc>) -> ScoredSocialItem {
    let score = social_score(&item);
    let relative_age = relative_age(item.created_at, now);
    let single_line_text = item.text.replace(['\n', '\r'], " ");
    let engagement_summary = format!(
        "👍 {} 🔄 {} 💬 {}",
        item.likes_count, item.retweets_count, item.replies_count
    );
    ScoredSocialItem {
        item,
        score,
        relative_age,
        single_line_text,
        engagement_summary,
    }
}

#[derive(Clone)]
pub struct SignalClient {
    api: Arc<dyn SocialSearchApi>,
    store: SignalStore<Vec<ScoredSocialItem>>,
    pacer: RequestPacer,
    /// Per-key gates so concurrent misses on one key fetch once
    inflight: Arc<DashMap<String, Arc<Mutex<()>>>>,
    config: SocialConfig,
}

impl SignalClient {
    pub fn new(api: Arc<dyn SocialSearchApi>, config: SocialConfig) -> Self {
        Self {
            api,
            store: SignalStore::new(Duration::from_secs(config.cache_ttl_secs)),
            pacer: RequestPacer::per_minute(config.requests_per_minute),
            inflight: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn pacer(&self) -> &RequestPacer {
        &self.pacer
    }

    pub fn cached_queries(&self) -> usize {
        self.store.len()
    }

    /// Queries per batch given the weighted cost of one search.
    pub fn batch_size(&self) -> usize {
        let weighted = (self.config.requests_per_minute / self.config.request_weight.max(1)) as usize;
        weighted.clamp(1, self.config.max_batch_size.max(1))
    }

    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<ScoredSocialItem>, TradingError> {
        let key = SignalStore::<Vec<ScoredSocialItem>>::key_for(query, max_results);

        if let Some(hit) = self.store.get(&key) {
            debug!(event = events::CACHE_HIT, "[SIGNAL] Using cached results for query: {}", query);
            return Ok(hit);
        }

        let gate = self
            .inflight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = gate.lock().await;

        // Another caller may have filled the entry while we waited.
        let result = match self.store.get(&key) {
            Some(hit) => Ok(hit),
            None => self.fetch(query, max_results, key.clone()).await,
        };

        drop(guard);
        drop(gate);
        self.inflight.remove_if(&key, |_, g| Arc::strong_count(g) == 1);

        result
    }

    async fn fetch(&self, query: &str, max_results: usize, key: String) -> Result<Vec<ScoredSocialItem>, TradingError> {
        self.pacer.wait_turn().await;

        let to = Utc::now();
        let from = to - chrono::Duration::days(self.config.lookback_days);
        let request = SearchRequest {
            query: query.to_string(),
            from,
            to,
            max_results,
        };

        let items = self.api.search(&request).await.map_err(|e| {
            error!("[SIGNAL] Error searching '{}': {}", query, e);
            e
        })?;

        let now = Utc::now();
        let enriched: Vec<ScoredSocialItem> = items.into_iter().map(|item| enrich(item, now)).collect();

        self.store.insert(key, enriched.clone());
        info!("[SIGNAL] Cached {} results for query: {}", enriched.len(), query);
        Ok(enriched)
    }

    /// Pause after a batch of `batch_len` searches: the time the weighted budget
    /// needs to cover it, never shorter than the configured batch delay.
    pub fn batch_interval(&self, batch_len: usize) -> Duration {
        let units = batch_len as u64 * self.config.request_weight.max(1) as u64;
        let budget = Duration::from_secs(60 * units) / self.config.requests_per_minute.max(1);
        budget.max(Duration::from_secs(self.config.batch_delay_secs))
    }

    /// Runs queries in weighted batches; members of a batch run concurrently and
    /// the pause between batches keeps weighted usage within the per-minute budget.
    /// Results keep query order.
    pub async fn search_many(&self, queries: &[String], max_results: usize) -> Result<Vec<ScoredSocialItem>, TradingError> {
        let batch_size = self.batch_size();
        let batches: Vec<&[String]> = queries.chunks(batch_size).collect();
        let mut all = Vec::new();

        for (i, batch) in batches.iter().enumerate() {
            debug!("[SIGNAL] Batch {}/{} ({} queries)", i + 1, batches.len(), batch.len());
            let results = try_join_all(batch.iter().map(|q| self.search(q, max_results))).await?;
            all.extend(results.into_iter().flatten());

            if i + 1 < batches.len() {
                let pause = self.batch_interval(batch.len());
                debug!(event = events::RATE_LIMITED, "[SIGNAL] Waiting {}s before next batch", pause.as_secs());
                sleep(pause).await;
            }
        }

        Ok(all)
    }
}
