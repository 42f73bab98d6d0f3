//! Domain model and ports of the PV/battery dimensioning workflow.

pub mod calculation;
pub mod casing;
pub mod config;
pub mod dimensioning;
pub mod engineering;
pub mod error;
pub mod results;

// Re-export common error type
pub use error::{Result, SizerError};
