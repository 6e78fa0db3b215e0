use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::TradingError;

use super::{base::BaseVenue, solana::SolanaVenue, traits::SwapVenue, types::Chain};

/// One venue per chain.
#[derive(Clone, Default)]
pub struct VenueRegistry {
    venues: HashMap<Chain, Arc<dyn SwapVenue>>,
}

impl VenueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, venue: Arc<dyn SwapVenue>) {
        self.venues.insert(venue.chain(), venue);
    }

    pub fn with_venue(mut self, venue: Arc<dyn SwapVenue>) -> Self {
        self.insert(venue);
        self
    }

    /// The venue trading `chain_id`, or `UnsupportedChain`.
    pub fn for_chain_id(&self, chain_id: &str) -> Result<Arc<dyn SwapVenue>, TradingError> {
        let chain = Chain::parse(chain_id)?;
        self.venues
            .get(&chain)
            .cloned()
            .ok_or_else(|| TradingError::UnsupportedChain {
                chain: chain_id.to_string(),
            })
    }

    pub fn get(&self, chain: Chain) -> Option<Arc<dyn SwapVenue>> {
        self.venues.get(&chain).cloned()
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}

/// Venues with missing credentials are left out with a warning.
pub fn build_venues(config: &AppConfig) -> VenueRegistry {
    let mut registry = VenueRegistry::new();

    match SolanaVenue::new(&config.solana) {
        Ok(venue) => {
            info!("[VENUES] Solana venue ready (wallet {})", venue.public_key());
            registry.insert(Arc::new(venue));
        }
        Err(e) => warn!("[VENUES] Solana venue disabled: {}", e),
    }

    match BaseVenue::new(&config.base) {
        Ok(venue) => {
            info!("[VENUES] Base venue ready (network {})", config.base.network);
            registry.insert(Arc::new(venue));
        }
        Err(e) => warn!("[VENUES] Base venue disabled: {}", e),
    }

    registry
}
