//! Local engineering calculators.
//!
//! These run entirely in-process and never touch the calculation engine.

mod cable;
mod losses;

pub use cable::{
    COMMERCIAL_SECTIONS_MM2, CableSizing, CableSizingEngine, CableSizingError, CableSizingInput,
    ConductorMaterial, ConnectionType, DROP_LIMIT_PERCENT,
};
pub use losses::{LatitudeBand, LossesEngine, MonthlyLosses};
