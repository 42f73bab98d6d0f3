//! Dimensioning domain module.
//!
//! This module contains the session aggregate, its seven domain records,
//! the per-step validation gate and the persistence ports.
//!
//! # Module Structure
//!
//! - `model`: Session and domain records (`DimensioningSession`, `Step`, ...)
//! - `patch`: Partial domain updates (`DomainPatch`)
//! - `step_gate`: Pure per-step validation (`StepGate`, `Violation`)
//! - `state`: The aggregate root (`DimensioningState`)
//! - `repository`: Remote and local persistence traits
//!
//! # Usage
//!
//! ```ignore
//! use pvsizer_core::dimensioning::{DimensioningState, DomainPatch, StepGate};
//! ```

mod model;
mod patch;
mod repository;
mod state;
mod step_gate;

pub use model::{
    BudgetDomain, ClientRef, CustomerDomain, DimensioningSession, DomainKind, EnergyDomain,
    GroupABill, GroupBBill, InverterSelection, LocationDomain, ModuleRef, MonthlySeries,
    MountingArea, PaymentTerms, RoofDomain, Step, SystemDomain, SystemLosses, TariffGroup,
    TariffRates,
};
pub use patch::{
    BudgetPatch, CustomerPatch, DomainPatch, EnergyPatch, LocationPatch, RoofPatch, SystemPatch,
};
pub use repository::{
    LocalSessionStore, PROJECT_TYPE_DIMENSIONING, ProjectRecord, ProjectRepository, SaveReceipt,
};
pub use state::{DimensioningState, Navigation, SaveCompletion, SaveTicket};
pub use step_gate::{StepGate, Violation};
