//! Application services orchestrating the dimensioning workflow.

pub mod calculation_service;
pub mod persistence;
pub mod workflow;

pub use calculation_service::CalculationService;
pub use persistence::{PersistenceCoordinator, SaveOutcome, SharedState};
pub use workflow::DimensioningWorkflow;
