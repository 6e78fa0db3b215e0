pub mod cookie;
pub mod dexscreener;
pub mod discovery;
pub mod portfolio;
pub mod signal;
pub mod store;
pub mod types;

#[cfg(test)]
mod signal_tests;
