use crate::config::ExecutionConfig;
use crate::error::TradingError;

/// Native-currency buy size, linear in confidence between the configured bounds.
/// Confidence at or below the minimum buys the minimum; at the maximum, the maximum.
pub fn buy_amount(confidence: f64, config: &ExecutionConfig) -> f64 {
    let span = config.max_confidence - config.min_confidence;
    let scale = if span > 0.0 {
        (confidence - config.min_confidence) / span
    } else {
        1.0
    };
    let amount = config.min_buy_amount + (config.max_buy_amount - config.min_buy_amount) * scale;
    amount.clamp(config.min_buy_amount, config.max_buy_amount)
}

/// Slippage escalation across swap attempts.
///
/// Starts at the initial slippage and doubles after every failure, capped at
/// the maximum. Gives up once the attempt budget is spent or the next value
/// would exceed the cap.
#[derive(Clone, Debug, PartialEq)]
pub struct SlippageBackoff {
    current: f64,
    max: f64,
    attempts: u32,
    max_attempts: u32,
}

impl SlippageBackoff {
    /// Rejects an initial slippage above the cap before any attempt is made.
    pub fn new(initial: f64, max: f64, max_attempts: u32) -> Result<Self, TradingError> {
        if initial > max {
            return Err(TradingError::SlippageAboveMax { initial, max });
        }
        Ok(Self {
            current: initial,
            max,
            attempts: 0,
            max_attempts: max_attempts.max(1),
        })
    }

    pub fn from_config(config: &ExecutionConfig) -> Result<Self, TradingError> {
        Self::new(config.initial_slippage, config.max_slippage, config.max_attempts)
    }

    /// Slippage for the next (or last) attempt.
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn next_slippage(&self) -> f64 {
        (self.current * 2.0).min(self.max)
    }

    /// Record a failed attempt. Returns the slippage to retry with, or `None` when done.
    pub fn record_failure(&mut self) -> Option<f64> {
        self.attempts += 1;
        let next = self.next_slippage();
        if self.attempts >= self.max_attempts || next > self.max {
            return None;
        }
        self.current = next;
        Some(next)
    }

    /// Terminal error after the last failure.
    pub fn exhausted(&self, last_error: String) -> TradingError {
        TradingError::ExhaustedRetries {
            attempts: self.attempts,
            last_error,
            final_slippage: self.current,
        }
    }
}
