pub mod factory;
pub mod traits;
pub mod types;

pub mod base;
pub mod solana;

pub use factory::{build_venues, VenueRegistry};
pub use traits::SwapVenue;
pub use types::{Chain, StakeReceipt, SwapReceipt, SwapRequest};
