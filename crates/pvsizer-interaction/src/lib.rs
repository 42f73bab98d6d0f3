//! Calculation-engine client.

pub mod engine_client;
pub mod retry;

pub use engine_client::HttpCalculationEngine;
pub use retry::{BackoffPolicy, RetryPolicy, run_with_retry};
