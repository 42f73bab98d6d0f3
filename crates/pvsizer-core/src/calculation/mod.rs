//! Calculation request building and the engine port.

mod engine;
mod request;

pub use engine::CalculationEngine;
pub use request::{CalculationRequest, ConsumptionInput};
