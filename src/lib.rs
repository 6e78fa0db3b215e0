//! Autotrader - autonomous memecoin trading
//!
//! Discovers candidate tokens, gathers market and social signals, asks a
//! language model for a decision and executes it on a chain venue with
//! slippage escalation.

pub mod agents;
pub mod bus;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod events;
pub mod exchange;
pub mod llm;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use bus::EventBus;
pub use config::AppConfig;
pub use error::{GenerationError, TradingError};
pub use events::{ExecutionReport, IterationSummary, WorkflowEvent};
pub use models::{ExecutionResult, Recommendation, TokenAnalysis, TradeDecision};
pub use services::workflow::TradingWorkflow;

#[cfg(test)]
mod bus_tests;
#[cfg(test)]
mod events_tests;
