use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants;
use crate::error::TradingError;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub analysis_interval_secs: u64,
    pub error_cooldown_secs: u64,
    pub max_concurrency: usize,
    pub trending_max_results: usize,
    pub social_results_per_token: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            analysis_interval_secs: constants::workflow::ANALYSIS_INTERVAL.as_secs(),
            error_cooldown_secs: constants::workflow::ERROR_COOLDOWN.as_secs(),
            max_concurrency: constants::workflow::MAX_CONCURRENCY,
            trending_max_results: constants::workflow::TRENDING_MAX_RESULTS,
            social_results_per_token: constants::workflow::SOCIAL_RESULTS_PER_TOKEN,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub cache_ttl_secs: u64,
    pub requests_per_minute: u32,
    pub request_weight: u32,
    pub max_batch_size: usize,
    pub batch_delay_secs: u64,
    pub lookback_days: i64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.cookie.fun/v1/hackathon".to_string(),
            cache_ttl_secs: constants::signal::CACHE_TTL.as_secs(),
            requests_per_minute: constants::signal::REQUESTS_PER_MINUTE,
            request_weight: constants::signal::REQUEST_WEIGHT,
            max_batch_size: constants::signal::MAX_BATCH_SIZE,
            batch_delay_secs: constants::signal::BATCH_DELAY.as_secs(),
            lookback_days: constants::signal::LOOKBACK_DAYS,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.dexscreener.com".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    pub api_key: Option<String>,
    pub wallet_address: Option<String>,
    pub base_url: String,
    pub network: String,
    pub cache_ttl_secs: u64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            wallet_address: None,
            base_url: "https://solana-gateway.moralis.io".to_string(),
            network: "mainnet".to_string(),
            cache_ttl_secs: constants::cache::PORTFOLIO_CACHE_TTL.as_secs(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub top_wallets_url: String,
    pub top_wallets_api_key: Option<String>,
    pub experienced_buyers_url: String,
    /// Reuses the portfolio provider key when unset
    pub experienced_buyers_api_key: Option<String>,
    pub experienced_buyers_chain: String,
    pub include_trending: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            top_wallets_url: "https://api.topwallets.ai".to_string(),
            top_wallets_api_key: None,
            experienced_buyers_url: "https://deep-index.moralis.io/api/v2.2".to_string(),
            experienced_buyers_api_key: None,
            experienced_buyers_chain: "eth".to_string(),
            include_trending: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub max_concurrent: usize,
    pub queue_size: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            max_concurrent: 4,
            queue_size: 100,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SolanaConfig {
    /// Base58-encoded keypair bytes
    pub private_key: Option<String>,
    pub rpc_url: Option<String>,
    pub jupiter_url: String,
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            rpc_url: None,
            jupiter_url: "https://quote-api.jup.ag/v6".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub api_key_name: Option<String>,
    pub api_key: Option<String>,
    pub wallet_address: Option<String>,
    pub api_url: String,
    pub network: String,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            api_key_name: None,
            api_key: None,
            wallet_address: None,
            api_url: "https://api.cdp.coinbase.com/platform".to_string(),
            network: "base-sepolia".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub min_confidence: f64,
    pub max_confidence: f64,
    pub min_buy_amount: f64,
    pub max_buy_amount: f64,
    pub initial_slippage: f64,
    pub max_slippage: f64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        use constants::execution::*;
        Self {
            min_confidence: MIN_CONFIDENCE,
            max_confidence: MAX_CONFIDENCE,
            min_buy_amount: MIN_BUY_AMOUNT,
            max_buy_amount: MAX_BUY_AMOUNT,
            initial_slippage: INITIAL_SLIPPAGE,
            max_slippage: MAX_SLIPPAGE,
            max_attempts: MAX_ATTEMPTS,
            retry_delay_ms: RETRY_DELAY.as_millis() as u64,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub bearer_token: Option<String>,
    pub api_url: String,
    /// Log the announcement instead of posting it
    pub dry_run: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bearer_token: None,
            api_url: "https://api.twitter.com/2/tweets".to_string(),
            dry_run: false,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Simulate trades instead of sending them to a venue
    pub dry_run: bool,
    pub workflow: WorkflowConfig,
    pub social: SocialConfig,
    pub market_data: MarketDataConfig,
    pub portfolio: PortfolioConfig,
    pub discovery: DiscoveryConfig,
    pub llm: LlmConfig,
    pub solana: SolanaConfig,
    pub base: BaseConfig,
    pub execution: ExecutionConfig,
    pub notification: NotificationConfig,
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

impl AppConfig {
    /// Reads `config.yaml` when present, then applies environment overrides.
    pub fn load() -> Result<Self, TradingError> {
        let config_path = Path::new("config.yaml");
        let mut config = if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .map_err(|e| TradingError::Config(format!("Failed to read config.yaml: {}", e)))?;
            Self::from_yaml_str(&content)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, TradingError> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        serde_yaml::from_str(content)
            .map_err(|e| TradingError::Config(format!("Failed to parse config.yaml: {}", e)))
    }

    /// Environment values win over file values. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("AUTOTRADER_DRY_RUN") {
            self.dry_run = parse_bool(&v);
        }
        if let Some(secs) = get("AUTOTRADER_ANALYSIS_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
            self.workflow.analysis_interval_secs = secs;
        }

        if let Some(v) = get("AUTOTRADER_COOKIE_API_KEY") {
            self.social.api_key = Some(v);
        }

        if let Some(v) = get("AUTOTRADER_MORALIS_API_KEY") {
            self.portfolio.api_key = Some(v);
        }
        if let Some(v) = get("AUTOTRADER_SOLANA_PUBLIC_KEY") {
            self.portfolio.wallet_address = Some(v);
        }
        if let Some(v) = get("AUTOTRADER_SOLANA_PRIVATE_KEY") {
            self.solana.private_key = Some(v);
        }
        if let Some(v) = get("AUTOTRADER_SOLANA_RPC_URL") {
            self.solana.rpc_url = Some(v);
        }

        if let Some(v) = get("AUTOTRADER_TOPWALLETS_API_KEY") {
            self.discovery.top_wallets_api_key = Some(v);
        }
        if let Some(v) = get("AUTOTRADER_TOPWALLETS_API_URL") {
            self.discovery.top_wallets_url = v;
        }

        if let Some(v) = get("AUTOTRADER_CDP_API_KEY_NAME") {
            self.base.api_key_name = Some(v);
        }
        if let Some(v) = get("AUTOTRADER_CDP_PRIVATE_KEY") {
            self.base.api_key = Some(v);
        }
        if let Some(v) = get("AUTOTRADER_BASE_WALLET_ADDRESS") {
            self.base.wallet_address = Some(v);
        }

        if let Some(v) = get("AUTOTRADER_TWITTER_BEARER_TOKEN") {
            self.notification.bearer_token = Some(v);
        }
        if let Some(v) = get("AUTOTRADER_TWITTER_DRY_RUN") {
            self.notification.dry_run = parse_bool(&v);
        }

        if let Some(v) = get("OPENAI_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = get("OPENAI_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Some(v) = get("LLM_MODEL") {
            self.llm.model = v;
        }
    }

    pub fn experienced_buyers_key(&self) -> Option<String> {
        self.discovery
            .experienced_buyers_api_key
            .clone()
            .or_else(|| self.portfolio.api_key.clone())
    }
}
