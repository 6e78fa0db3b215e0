use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::ExecutionConfig;
use crate::constants::events;
use crate::data::types::{MarketPair, Token};
use crate::error::TradingError;
use crate::exchange::{StakeReceipt, SwapReceipt, SwapRequest, SwapVenue, VenueRegistry};
use crate::models::{ExecutionResult, Recommendation, TradeDecision};
use crate::services::execution_utils::{buy_amount, SlippageBackoff};

/// Turns decisions into venue swaps.
pub struct ExecutionEngine {
    venues: VenueRegistry,
    config: ExecutionConfig,
    /// Mirror decisions without calling a venue
    simulate: bool,
}

impl ExecutionEngine {
    pub fn new(venues: VenueRegistry, config: ExecutionConfig, simulate: bool) -> Self {
        Self {
            venues,
            config,
            simulate,
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.simulate
    }

    /// Never fails; every error ends up in `ExecutionResult::error`.
    pub async fn execute(&self, token: &Token, decision: &TradeDecision, market: &[MarketPair]) -> ExecutionResult {
        if decision.confidence < self.config.min_confidence {
            info!(
                "⏸️ [EXEC] {} confidence {:.0} below {:.0}, holding",
                token.symbol, decision.confidence, self.config.min_confidence
            );
            return ExecutionResult::succeeded(Recommendation::Hold, token, decision, market)
                .with_note("Confidence too low");
        }

        if self.simulate {
            info!(
                "🧪 [DRY RUN] Would execute {} for {} (confidence: {:.0}, reasoning: {})",
                decision.recommendation, token.symbol, decision.confidence, decision.reasoning
            );
            return ExecutionResult::succeeded(decision.recommendation, token, decision, market);
        }

        match self.try_execute(token, decision, market).await {
            Ok(result) => result,
            Err(e) => {
                error!(
                    "❌ [EXEC] Failed to execute {} for {}: {}",
                    decision.recommendation, token.symbol, e
                );
                ExecutionResult::failed(decision.recommendation, e.to_string(), token, Some(decision), market)
            }
        }
    }

    async fn try_execute(
        &self,
        token: &Token,
        decision: &TradeDecision,
        market: &[MarketPair],
    ) -> Result<ExecutionResult, TradingError> {
        let venue = self.venues.for_chain_id(&token.chain_id)?;

        match decision.recommendation {
            Recommendation::Buy => {
                let amount = buy_amount(decision.confidence, &self.config);
                let request = SwapRequest::new(venue.native_symbol(), &token.address, amount);
                let receipt = self.swap_with_retry(venue.as_ref(), request).await?;

                info!(
                    event = events::TRADE_EXECUTED,
                    "✅ [EXEC] Executed BUY for {} ({} {})",
                    token.symbol,
                    amount,
                    venue.native_symbol()
                );
                Ok(ExecutionResult::succeeded(Recommendation::Buy, token, decision, market)
                    .with_fill(amount, receipt.signature))
            }
            Recommendation::Sell => {
                let amount = match token.balance.as_ref() {
                    Some(balance) if balance.amount > 0.0 => balance.amount,
                    _ => {
                        return Err(TradingError::NoBalance {
                            symbol: token.symbol.clone(),
                        })
                    }
                };
                let request = SwapRequest::new(&token.address, venue.native_symbol(), amount);
                let receipt = self.swap_with_retry(venue.as_ref(), request).await?;

                info!(event = events::TRADE_EXECUTED, "✅ [EXEC] Executed SELL for {}", token.symbol);
                Ok(ExecutionResult::succeeded(Recommendation::Sell, token, decision, market)
                    .with_fill(amount, receipt.signature))
            }
            Recommendation::Hold => {
                info!("✋ [EXEC] Holding position in {}", token.symbol);
                Ok(ExecutionResult::succeeded(Recommendation::Hold, token, decision, market))
            }
        }
    }

    /// Stake native currency on the venue trading `chain_id`.
    pub async fn stake(&self, chain_id: &str, amount: f64) -> Result<StakeReceipt, TradingError> {
        let venue = self.venues.for_chain_id(chain_id)?;
        if self.simulate {
            info!("🧪 [DRY RUN] Would stake {} {} on {}", amount, venue.native_symbol(), venue.name());
            return Ok(StakeReceipt {
                signature: String::new(),
                amount,
                received_amount: amount,
            });
        }

        let receipt = venue.stake(amount).await?;
        info!("✅ [EXEC] Staked {} {} ({})", receipt.amount, venue.native_symbol(), receipt.signature);
        Ok(receipt)
    }

    /// Swap with doubling slippage until it fills or the backoff gives up.
    pub async fn swap_with_retry(&self, venue: &dyn SwapVenue, request: SwapRequest) -> Result<SwapReceipt, TradingError> {
        let mut backoff = SlippageBackoff::from_config(&self.config).map_err(|e| {
            error!("❌ [EXEC] Swap failed - slippage too high: {}", e);
            e
        })?;
        let retry_delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            let slippage = backoff.current();
            info!(
                event = events::SWAP_ATTEMPT,
                "🔄 [EXEC] Swap attempt {}/{} on {} (slippage: {}%, {} -> {}, amount: {})",
                backoff.attempts() + 1,
                backoff.max_attempts(),
                venue.name(),
                slippage,
                request.from_token,
                request.to_token,
                request.amount
            );

            let err = match venue.swap(request.with_slippage(slippage)).await {
                Ok(receipt) => return Ok(receipt),
                Err(e) => e,
            };

            let next = backoff.record_failure();
            warn!(
                event = events::SWAP_RETRY,
                "⚠️ [EXEC] Swap failed, attempt {}/{}: {} (slippage: {}%, next: {:?})",
                backoff.attempts(),
                backoff.max_attempts(),
                err,
                slippage,
                next
            );

            if next.is_none() {
                let exhausted = backoff.exhausted(err.to_string());
                error!(event = events::SWAP_EXHAUSTED, "❌ [EXEC] All swap attempts failed: {}", exhausted);
                return Err(exhausted);
            }

            tokio::time::sleep(retry_delay).await;
        }
    }
}
