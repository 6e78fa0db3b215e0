//! Unit tests for execution utilities - buy sizing and slippage backoff.

#[cfg(test)]
mod execution_utils_tests {
    use crate::config::ExecutionConfig;
    use crate::error::TradingError;
    use crate::services::execution_utils::*;

    // ============= Buy Sizing Tests =============

    #[test]
    fn test_buy_amount_bounds() {
        let cfg = ExecutionConfig::default();
        assert_eq!(buy_amount(75.0, &cfg), 0.001);
        assert!((buy_amount(100.0, &cfg) - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_buy_amount_scales_linearly() {
        let cfg = ExecutionConfig::default();
        let mid = buy_amount(87.5, &cfg);
        assert!((mid - 0.003).abs() < 1e-12);
    }

    #[test]
    fn test_buy_amount_clamped_outside_range() {
        let cfg = ExecutionConfig::default();
        assert_eq!(buy_amount(10.0, &cfg), 0.001);
        assert_eq!(buy_amount(250.0, &cfg), 0.005);
    }

    // ============= Slippage Backoff Tests =============

    fn tried_sequence(mut backoff: SlippageBackoff) -> Vec<f64> {
        let mut tried = vec![backoff.current()];
        while let Some(next) = backoff.record_failure() {
            tried.push(next);
        }
        tried
    }

    #[test]
    fn test_backoff_doubles_until_attempts_spent() {
        let backoff = SlippageBackoff::new(1.0, 30.0, 5).unwrap();
        assert_eq!(tried_sequence(backoff), vec![1.0, 2.0, 4.0, 8.0, 16.0]);
    }

    #[test]
    fn test_backoff_caps_at_max() {
        let backoff = SlippageBackoff::new(5.0, 30.0, 5).unwrap();
        assert_eq!(tried_sequence(backoff), vec![5.0, 10.0, 20.0, 30.0, 30.0]);
    }

    #[test]
    fn test_backoff_single_attempt() {
        let mut backoff = SlippageBackoff::new(1.0, 30.0, 1).unwrap();
        assert_eq!(backoff.record_failure(), None);
        assert_eq!(backoff.attempts(), 1);
    }

    #[test]
    fn test_initial_above_max_rejected() {
        let err = SlippageBackoff::new(31.0, 30.0, 5).unwrap_err();
        assert!(matches!(err, TradingError::SlippageAboveMax { .. }));
        assert_eq!(err.to_string(), "Initial slippage 31.0% exceeds maximum allowed 30.0%");
    }

    #[test]
    fn test_exhausted_error_message() {
        let mut backoff = SlippageBackoff::new(1.0, 30.0, 2).unwrap();
        assert_eq!(backoff.record_failure(), Some(2.0));
        assert_eq!(backoff.record_failure(), None);

        let err = backoff.exhausted("Price moved too much, try increasing slippage".to_string());
        assert_eq!(
            err.to_string(),
            "Swap failed after 2 attempts. Last error: Price moved too much, try increasing slippage. Final slippage tried: 2.0%"
        );
    }

    #[test]
    fn test_backoff_from_config() {
        let backoff = SlippageBackoff::from_config(&ExecutionConfig::default()).unwrap();
        assert_eq!(backoff.current(), 1.0);
        assert_eq!(backoff.max_attempts(), 5);
    }
}
