pub mod analysis;
pub mod decision;
pub mod execution;
pub mod execution_utils;
pub mod notification;
pub mod scoring;
pub mod workflow;

#[cfg(test)]
mod analysis_tests;
#[cfg(test)]
mod decision_tests;
#[cfg(test)]
mod execution_utils_tests;
#[cfg(test)]
mod notification_tests;
