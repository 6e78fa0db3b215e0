//! Custom error types for the trading system
//!
//! Provides structured, typed errors instead of generic Box<dyn Error>

use thiserror::Error;

/// Top-level trading system errors
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{service} request failed: {message}")]
    Remote { service: String, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Insufficient funds for swap")]
    InsufficientFunds,

    #[error("Price moved too much, try increasing slippage")]
    SlippageExceeded,

    #[error("Initial slippage {initial:.1}% exceeds maximum allowed {max:.1}%")]
    SlippageAboveMax { initial: f64, max: f64 },

    #[error("Unsupported chain: {chain}")]
    UnsupportedChain { chain: String },

    #[error("No balance")]
    NoBalance { symbol: String },

    #[error(
        "Swap failed after {attempts} attempts. Last error: {last_error}. Final slippage tried: {final_slippage:.1}%"
    )]
    ExhaustedRetries {
        attempts: u32,
        last_error: String,
        final_slippage: f64,
    },

    #[error("Venue error: {0}")]
    Venue(String),

    #[error("Staking is not supported on {venue}")]
    StakeUnsupported { venue: String },

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

impl TradingError {
    pub fn remote(service: &str, message: impl Into<String>) -> Self {
        TradingError::Remote {
            service: service.to_string(),
            message: message.into(),
        }
    }
}

/// Errors from the external text-generation capability
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("Malformed LLM output: {0}")]
    Malformed(String),

    #[error("LLM queue is closed")]
    QueueClosed,

    #[error("LLM request was cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for TradingError {
    fn from(err: serde_json::Error) -> Self {
        TradingError::Parse(err.to_string())
    }
}

/// Helper to check if a venue diagnostic reports missing funds
pub fn is_insufficient_funds_error(diagnostic: &str) -> bool {
    let lower = diagnostic.to_lowercase();
    lower.contains("insufficient funds") || lower.contains("insufficient lamports")
}

/// Helper to check if a venue diagnostic reports a slippage breach
pub fn is_slippage_error(diagnostic: &str) -> bool {
    let lower = diagnostic.to_lowercase();
    lower.contains("slippage tolerance exceeded") || lower.contains("0x1771")
}

/// Map raw venue diagnostics (RPC logs, API bodies) onto typed failures.
pub fn classify_venue_failure<S: AsRef<str>>(diagnostics: &[S]) -> Option<TradingError> {
    if diagnostics.iter().any(|d| is_insufficient_funds_error(d.as_ref())) {
        return Some(TradingError::InsufficientFunds);
    }
    if diagnostics.iter().any(|d| is_slippage_error(d.as_ref())) {
        return Some(TradingError::SlippageExceeded);
    }
    None
}
