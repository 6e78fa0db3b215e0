//! Public announcements of filled trades.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use reqwest::Client;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::agents::{Agent, AnnouncerAgent};
use crate::config::NotificationConfig;
use crate::error::TradingError;
use crate::llm::TextGenerator;
use crate::models::{ExecutionResult, Recommendation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        };
        f.write_str(s)
    }
}

/// One point each for a >20% daily move, under $10k liquidity and confidence below 0.6.
/// `confidence` is a fraction in 0..=1.
pub fn risk_level(price_change_24h: f64, liquidity_usd: f64, confidence: f64) -> RiskLevel {
    let factors = [
        price_change_24h.abs() > 20.0,
        liquidity_usd < 10_000.0,
        confidence < 0.6,
    ]
    .iter()
    .filter(|f| **f)
    .count();

    match factors {
        0 => RiskLevel::Low,
        1 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}

/// Where announcement text ends up.
#[async_trait]
pub trait PostSink: Send + Sync {
    async fn post(&self, text: &str) -> Result<(), TradingError>;
}

pub struct TwitterPoster {
    client: Client,
    api_url: String,
    bearer_token: String,
}

impl TwitterPoster {
    pub fn new(config: &NotificationConfig) -> Result<Self, TradingError> {
        let bearer_token = config
            .bearer_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TradingError::Config("Twitter bearer token is not set".to_string()))?;
        Ok(Self {
            client: Client::new(),
            api_url: config.api_url.clone(),
            bearer_token,
        })
    }
}

#[async_trait]
impl PostSink for TwitterPoster {
    async fn post(&self, text: &str) -> Result<(), TradingError> {
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.bearer_token)
            .json(&json!({ "text": text }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TradingError::remote("twitter", format!("HTTP {}: {}", status, body)));
        }
        Ok(())
    }
}

/// Logs the text and reports success.
pub struct DryRunSink;

#[async_trait]
impl PostSink for DryRunSink {
    async fn post(&self, text: &str) -> Result<(), TradingError> {
        info!("🧪 [NOTIFY] Dry run mode - would have posted: {}", text);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TradeAlert {
    pub symbol: String,
    pub token_address: String,
    pub action: Recommendation,
    pub amount: f64,
    /// Fraction in 0..=1
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub price_usd: f64,
    pub price_change_24h: f64,
    pub volume_24h: f64,
    pub liquidity_usd: f64,
    pub signature: Option<String>,
    pub reasoning: String,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
}

impl TradeAlert {
    /// `None` unless the result is a filled BUY or SELL with market data.
    pub fn from_result(result: &ExecutionResult) -> Option<Self> {
        if !result.success || result.action == Recommendation::Hold {
            return None;
        }
        let pair = result.market_data.first()?;
        let decision = result.decision.as_ref();
        let confidence = decision.map(|d| d.confidence).unwrap_or(0.0) / 100.0;
        let price_change_24h = pair.price_change.h24.unwrap_or(0.0);
        let liquidity_usd = pair.liquidity_usd();

        Some(Self {
            symbol: result.token.symbol.clone(),
            token_address: result.token.address.clone(),
            action: result.action,
            amount: result.amount.unwrap_or(0.0),
            confidence,
            risk_level: risk_level(price_change_24h, liquidity_usd, confidence),
            price_usd: pair.price_usd(),
            price_change_24h,
            volume_24h: pair.volume.h24.unwrap_or(0.0),
            liquidity_usd,
            signature: result.signature.clone(),
            reasoning: decision.map(|d| d.reasoning.clone()).unwrap_or_default(),
            risks: decision.map(|d| d.risks.clone()).unwrap_or_default(),
            opportunities: decision.map(|d| d.opportunities.clone()).unwrap_or_default(),
        })
    }

    /// Sells explained by a loss are not announced.
    pub fn is_loss_exit(&self) -> bool {
        self.action == Recommendation::Sell && self.reasoning.to_lowercase().contains("loss")
    }

    pub fn dedup_key(&self) -> String {
        format!("{}-{}", self.symbol, self.action)
    }

    fn context(&self) -> String {
        format!(
            "Write a post about your {action} trade.\n\n\
             Context:\n\
             Token: {symbol}\n\
             Action: {action}\n\
             Price: ${price:.6}\n\
             Reasoning: {reasoning}\n\
             Key Opportunities: {opportunities}\n\
             Risks: {risks}\n\n\
             Use the cashtag ${symbol}.",
            action = self.action,
            symbol = self.symbol,
            price = self.price_usd,
            reasoning = self.reasoning,
            opportunities = self.opportunities.join(", "),
            risks = self.risks.join(", "),
        )
    }
}

/// Announces each (symbol, action) at most once per process.
pub struct TradeAnnouncer {
    generator: Arc<dyn TextGenerator>,
    sink: Arc<dyn PostSink>,
    agent: AnnouncerAgent,
    announced: DashMap<String, DateTime<Utc>>,
}

impl TradeAnnouncer {
    pub fn new(generator: Arc<dyn TextGenerator>, sink: Arc<dyn PostSink>) -> Self {
        Self {
            generator,
            sink,
            agent: AnnouncerAgent,
            announced: DashMap::new(),
        }
    }

    /// `None` when announcements are disabled or the poster has no credentials.
    pub fn from_config(config: &NotificationConfig, generator: Arc<dyn TextGenerator>) -> Option<Self> {
        if !config.enabled {
            info!("[NOTIFY] Announcements disabled");
            return None;
        }
        if config.dry_run {
            return Some(Self::new(generator, Arc::new(DryRunSink)));
        }
        match TwitterPoster::new(config) {
            Ok(poster) => Some(Self::new(generator, Arc::new(poster))),
            Err(e) => {
                warn!("[NOTIFY] Announcements disabled: {}", e);
                None
            }
        }
    }

    pub fn was_announced(&self, key: &str) -> bool {
        self.announced.contains_key(key)
    }

    /// Returns how many posts went out.
    pub async fn notify_successful_trades(&self, results: &[ExecutionResult]) -> usize {
        let alerts: Vec<TradeAlert> = results
            .iter()
            .filter_map(TradeAlert::from_result)
            .filter(|alert| !alert.is_loss_exit())
            .filter(|alert| !self.was_announced(&alert.dedup_key()))
            .collect();

        let mut posted = 0;
        for alert in alerts {
            // The same key can appear twice within one batch
            if self.was_announced(&alert.dedup_key()) {
                continue;
            }
            if self.post_trade_alert(&alert).await {
                self.announced.insert(alert.dedup_key(), Utc::now());
                posted += 1;
            }
        }
        posted
    }

    pub async fn post_trade_alert(&self, alert: &TradeAlert) -> bool {
        let text = match self.agent.run(&alert.context(), self.generator.as_ref()).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!("❌ [NOTIFY] Failed to write announcement for {}: {}", alert.symbol, e);
                return false;
            }
        };

        match self.sink.post(&text).await {
            Ok(()) => {
                info!(
                    "📣 [NOTIFY] Posted {} alert for {} (risk: {}): {}",
                    alert.action, alert.symbol, alert.risk_level, text
                );
                true
            }
            Err(e) => {
                error!("❌ [NOTIFY] Failed to post {} alert for {}: {}", alert.action, alert.symbol, e);
                false
            }
        }
    }
}
