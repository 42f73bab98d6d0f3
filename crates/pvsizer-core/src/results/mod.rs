//! Calculation results and the engine-reply translator.
//!
//! - `model`: typed result records (`DimensioningResults`)
//! - `payload`: the raw engine reply (`EnginePayload`)
//! - `translator`: validation and conversion (`ResultTranslator`)

mod model;
mod payload;
mod translator;

#[cfg(test)]
pub(crate) mod test_support;

pub use model::{
    AnnualConsumption, AnnualSummaryRow, CashFlowRow, CostComparison, DimensioningResults,
    FinancialMetrics, GroupAInitialSums, GroupAResult, GroupBResult, InitialSums, Sensitivity,
};
pub use payload::{EnginePayload, RESULT_MARKER_FIELD};
pub use translator::ResultTranslator;
