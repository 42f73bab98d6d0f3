//! Runs a calculation for the active session and stores the typed result.

use crate::persistence::SharedState;
use pvsizer_core::calculation::{CalculationEngine, CalculationRequest};
use pvsizer_core::error::Result;
use pvsizer_core::results::{DimensioningResults, ResultTranslator};
use std::sync::Arc;
use tracing::{info, warn};

pub struct CalculationService {
    engine: Arc<dyn CalculationEngine>,
}

impl CalculationService {
    pub fn new(engine: Arc<dyn CalculationEngine>) -> Self {
        Self { engine }
    }

    /// Builds the request from the current session, calls the engine and
    /// writes the translated result back.
    ///
    /// The session lock is not held while the engine works, so edits made in
    /// the meantime stay possible. A reply for the session's current group is
    /// applied even if inputs changed meanwhile (last write wins); a reply for
    /// a group the session no longer has is refused by `set_results`.
    ///
    /// Any failure leaves the previous results untouched.
    pub async fn run(&self, state: &SharedState) -> Result<DimensioningResults> {
        let (group, request) = {
            let state = state.lock().await;
            let session = state.session();
            (
                session.tariff_group(),
                CalculationRequest::from_session(session)?,
            )
        };

        let payload = self.engine.calculate(group, &request).await.map_err(|e| {
            warn!(group = %group, error = %e, "Calculation request failed");
            e
        })?;

        let results = ResultTranslator::translate(group, payload)?;
        state.lock().await.set_results(results.clone())?;
        info!(group = %group, "Calculation results stored");
        Ok(results)
    }
}
