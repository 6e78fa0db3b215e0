//! Application-wide constants and magic numbers
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make the codebase easier to tune.

use std::time::Duration;

/// Social signal search constants
pub mod signal {
    use super::*;

    /// How long a cached search result stays fresh
    pub const CACHE_TTL: Duration = Duration::from_secs(20 * 60);

    /// Nominal request budget of the search provider
    pub const REQUESTS_PER_MINUTE: u32 = 10;

    /// Each search consumes this many nominal request units
    pub const REQUEST_WEIGHT: u32 = 12;

    /// Upper bound on concurrently issued searches in one batch
    pub const MAX_BATCH_SIZE: usize = 3;

    /// Minimum pause between batches of `search_many`
    pub const BATCH_DELAY: Duration = Duration::from_secs(20);

    /// Trailing window covered by a search
    pub const LOOKBACK_DAYS: i64 = 3;
}

/// Market pair scoring tables, indexed by age bucket
/// (<=30min, <=1h, <=6h, <=24h, >24h)
pub mod scoring {
    pub const LIQUIDITY_THRESHOLDS: [f64; 5] = [10_000.0, 20_000.0, 50_000.0, 100_000.0, 200_000.0];
    pub const VOLUME_THRESHOLDS: [f64; 5] = [5_000.0, 10_000.0, 25_000.0, 50_000.0, 100_000.0];
    pub const MARKET_CAP_THRESHOLDS: [f64; 5] = [25_000.0, 50_000.0, 100_000.0, 200_000.0, 500_000.0];
    pub const TXN_THRESHOLDS: [f64; 5] = [10.0, 20.0, 50.0, 100.0, 200.0];

    pub const AGE_BONUS: [f64; 5] = [15.0, 10.0, 7.0, 5.0, 0.0];

    /// Social item engagement weights
    pub const LIKE_WEIGHT: f64 = 1.0;
    pub const REPLY_WEIGHT: f64 = 3.0;
    pub const REPOST_WEIGHT: f64 = 5.0;
    pub const QUOTE_WEIGHT: f64 = 10.0;
    pub const SMART_ENGAGEMENT_WEIGHT: f64 = 5.0;
}

/// Execution and retry constants
pub mod execution {
    use super::*;

    /// Minimum confidence to execute trades
    pub const MIN_CONFIDENCE: f64 = 75.0;
    pub const MAX_CONFIDENCE: f64 = 100.0;

    /// Native-currency buy size range
    pub const MIN_BUY_AMOUNT: f64 = 0.001;
    pub const MAX_BUY_AMOUNT: f64 = 0.005;

    /// Slippage percentages
    pub const INITIAL_SLIPPAGE: f64 = 1.0;
    pub const MAX_SLIPPAGE: f64 = 30.0;

    pub const MAX_ATTEMPTS: u32 = 5;
    pub const RETRY_DELAY: Duration = Duration::from_secs(5);

    /// Minimum SOL amount accepted for staking
    pub const MIN_STAKE_AMOUNT: f64 = 0.001;
}

/// Orchestrator loop constants
pub mod workflow {
    use super::*;

    pub const ANALYSIS_INTERVAL: Duration = Duration::from_secs(6 * 60);
    pub const ERROR_COOLDOWN: Duration = Duration::from_secs(30);

    /// Per-stage fan-out bound
    pub const MAX_CONCURRENCY: usize = 8;

    pub const TRENDING_MAX_RESULTS: usize = 10;
    pub const TOP_WALLET_TOKENS: usize = 3;
    pub const SOCIAL_RESULTS_PER_TOKEN: usize = 10;
}

/// Caching constants
pub mod cache {
    use super::*;

    /// Wallet holdings cache TTL
    pub const PORTFOLIO_CACHE_TTL: Duration = Duration::from_secs(60);
}

/// Well-known token addresses
pub mod tokens {
    pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
    pub const JUPSOL_MINT: &str = "jupSoLaHXQiZZTSfEWMTRRgpnyFm8f6sZdosWBjx93v";
}

/// Logging event names for structured logging
pub mod events {
    pub const SWAP_ATTEMPT: &str = "swap_attempt";
    pub const SWAP_RETRY: &str = "swap_retry";
    pub const SWAP_EXHAUSTED: &str = "swap_exhausted";
    pub const TRADE_EXECUTED: &str = "trade_executed";
    pub const DECISION_COERCED: &str = "decision_coerced";
    pub const CACHE_HIT: &str = "cache_hit";
    pub const RATE_LIMITED: &str = "rate_limited";
}
