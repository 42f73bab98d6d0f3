use super::request::CalculationRequest;
use crate::dimensioning::TariffGroup;
use crate::error::Result;
use crate::results::EnginePayload;
use async_trait::async_trait;

/// Port to the remote financial/energy simulation.
///
/// Implementations send the request to the endpoint matching `group` and
/// return the unwrapped result object. They never interpret the result; that
/// is the job of `ResultTranslator`.
#[async_trait]
pub trait CalculationEngine: Send + Sync {
    /// Runs one calculation.
    ///
    /// # Errors
    ///
    /// - `SizerError::Network` when the engine cannot be reached or answers
    ///   with a non-success status
    /// - `SizerError::Structural` when the reply has no recognizable envelope
    async fn calculate(
        &self,
        group: TariffGroup,
        request: &CalculationRequest,
    ) -> Result<EnginePayload>;
}
