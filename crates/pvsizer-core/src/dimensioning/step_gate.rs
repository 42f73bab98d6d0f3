//! Per-step completeness rules.

use super::model::{DimensioningSession, Step};
use serde::Serialize;

/// A single reason a step is not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub step: Step,
    /// Dotted path of the offending field, for inline rendering.
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    fn new(step: Step, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            step,
            field,
            message: message.into(),
        }
    }
}

/// Pure validation of each workflow stage.
///
/// `validate` reads the session and nothing else, so calling it twice on the
/// same session always yields the same violations.
pub struct StepGate;

impl StepGate {
    pub fn validate(step: Step, session: &DimensioningSession) -> Vec<Violation> {
        match step {
            Step::Customer => Self::validate_customer(session),
            Step::Energy => Self::validate_energy(session),
            Step::Location => Self::validate_location(session),
            Step::System => Self::validate_system(session),
            // Roof data is optional and results are computed, not entered.
            Step::Roof | Step::Results => Vec::new(),
            Step::Budget => Self::validate_budget(session),
        }
    }

    pub fn is_complete(step: Step, session: &DimensioningSession) -> bool {
        Self::validate(step, session).is_empty()
    }

    fn validate_customer(session: &DimensioningSession) -> Vec<Violation> {
        let mut violations = Vec::new();
        if session.name.trim().is_empty() {
            violations.push(Violation::new(
                Step::Customer,
                "name",
                "Session name is required",
            ));
        }
        let has_client = session
            .customer
            .client
            .as_ref()
            .is_some_and(|c| !c.id.trim().is_empty());
        if !has_client {
            violations.push(Violation::new(
                Step::Customer,
                "customer.client",
                "Select a customer",
            ));
        }
        violations
    }

    /// Either group's bills qualify, whatever the primary classification is.
    fn validate_energy(session: &DimensioningSession) -> Vec<Violation> {
        let energy = &session.energy;
        let group_a = energy.group_a_bills.iter().any(|b| b.has_consumption());
        let group_b = energy.group_b_bills.iter().any(|b| b.has_consumption());
        if group_a || group_b {
            Vec::new()
        } else {
            vec![Violation::new(
                Step::Energy,
                "energy.bills",
                "Add at least one energy bill with non-zero monthly consumption",
            )]
        }
    }

    fn validate_location(session: &DimensioningSession) -> Vec<Violation> {
        let location = &session.location;
        let mut violations = Vec::new();
        if location.coordinates().is_none() {
            violations.push(Violation::new(
                Step::Location,
                "location.coordinates",
                "Installation coordinates are required",
            ));
        }
        if location.irradiance.len() != 12 {
            violations.push(Violation::new(
                Step::Location,
                "location.irradiance",
                format!(
                    "Irradiance must have 12 monthly values, found {}",
                    location.irradiance.len()
                ),
            ));
        } else if !location.irradiance.iter().any(|v| *v > 0.0) {
            violations.push(Violation::new(
                Step::Location,
                "location.irradiance",
                "Irradiance must have at least one positive month",
            ));
        }
        violations
    }

    fn validate_system(session: &DimensioningSession) -> Vec<Violation> {
        let system = &session.system;
        let mut violations = Vec::new();
        match &system.module {
            None => violations.push(Violation::new(
                Step::System,
                "system.module",
                "Select a PV module",
            )),
            Some(module) if module.power_w <= 0.0 => violations.push(Violation::new(
                Step::System,
                "system.module.powerW",
                "Module rated power must be greater than zero",
            )),
            Some(_) => {}
        }
        if system.inverters.is_empty() {
            violations.push(Violation::new(
                Step::System,
                "system.inverters",
                "Select at least one inverter",
            ));
        }
        violations
    }

    fn validate_budget(session: &DimensioningSession) -> Vec<Violation> {
        if session.budget.total_investment() > 0.0 {
            Vec::new()
        } else {
            vec![Violation::new(
                Step::Budget,
                "budget.totalInvestment",
                "Total investment must be greater than zero",
            )]
        }
    }
}
