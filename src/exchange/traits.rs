use async_trait::async_trait;

use crate::error::TradingError;

use super::types::{Chain, StakeReceipt, SwapReceipt, SwapRequest};

pub type VenueResult<T> = Result<T, TradingError>;

#[async_trait]
pub trait SwapVenue: Send + Sync {
    fn name(&self) -> &'static str;
    fn chain(&self) -> Chain;
    /// Symbol accepted in `SwapRequest` for the chain's native currency.
    fn native_symbol(&self) -> &'static str;

    /// One swap at the request's slippage. Retries are the caller's concern.
    async fn swap(&self, request: SwapRequest) -> VenueResult<SwapReceipt>;

    async fn stake(&self, _amount: f64) -> VenueResult<StakeReceipt> {
        Err(TradingError::StakeUnsupported {
            venue: self.name().to_string(),
        })
    }
}
