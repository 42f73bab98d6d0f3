//! Validation and conversion of engine replies into typed results.

use super::model::{DimensioningResults, GroupAResult, GroupBResult};
use super::payload::EnginePayload;
use crate::casing::to_domain_casing;
use crate::dimensioning::TariffGroup;
use crate::error::{Result, SizerError};
use serde_json::Value;
use tracing::{debug, warn};

const FINANCIAL_METRICS: [&str; 9] = [
    "npv",
    "irr",
    "profitability_index",
    "simple_payback_years",
    "discounted_payback_years",
    "lcoe",
    "simple_roi",
    "total_savings_nominal",
    "total_savings_present_value",
];

const GROUP_A_INITIAL_SUMS: [&str; 2] = ["consumption_peak_kwh", "consumption_off_peak_kwh"];
const GROUP_A_ANNUAL_CONSUMPTION: [&str; 2] = ["peak_kwh", "off_peak_kwh"];
const GROUP_B_COST_COMPARISON: [&str; 3] =
    ["cost_without_system", "cost_with_system", "annual_savings"];

/// Block only a group A reply carries.
const GROUP_A_ONLY_BLOCK: &str = "sensitivity";
/// Block only a group B reply carries.
const GROUP_B_ONLY_BLOCK: &str = "cost_comparison";

/// Turns an `EnginePayload` into `DimensioningResults`.
///
/// `translate` is the entry point: it runs the required-field checklist and
/// only converts payloads that pass it.
pub struct ResultTranslator;

impl ResultTranslator {
    /// Validates then converts. The only path callers should use.
    pub fn translate(group: TariffGroup, payload: EnginePayload) -> Result<DimensioningResults> {
        let missing = Self::missing_fields(group, &payload);
        if !missing.is_empty() {
            warn!(group = %group, missing = ?missing, "Rejecting engine reply");
            return Err(SizerError::structural(format!(
                "group {} reply is missing required data: {}",
                group,
                missing.join(", ")
            )));
        }
        Self::convert(group, payload)
    }

    /// Whether the payload carries every block the group requires.
    pub fn validate_payload(group: TariffGroup, payload: &EnginePayload) -> bool {
        Self::missing_fields(group, payload).is_empty()
    }

    /// Dotted paths (engine casing) of every required entry that is absent.
    pub fn missing_fields(group: TariffGroup, payload: &EnginePayload) -> Vec<String> {
        let raw = payload.as_value();
        let mut missing = Vec::new();

        require_object(raw, "initial_sums", &mut missing);
        require_fields(raw, "financial_metrics", &FINANCIAL_METRICS, &mut missing);
        require_non_empty_array(raw, "annual_summary", &mut missing);
        require_non_empty_array(raw, "cash_flow", &mut missing);

        match group {
            TariffGroup::A => {
                if raw.get("initial_sums").is_some_and(Value::is_object) {
                    require_fields(raw, "initial_sums", &GROUP_A_INITIAL_SUMS, &mut missing);
                }
                require_fields(
                    raw,
                    "annual_consumption",
                    &GROUP_A_ANNUAL_CONSUMPTION,
                    &mut missing,
                );
                check_sensitivity(raw, &mut missing);
            }
            TariffGroup::B => {
                require_fields(
                    raw,
                    GROUP_B_ONLY_BLOCK,
                    &GROUP_B_COST_COMPARISON,
                    &mut missing,
                );
            }
        }

        missing
    }

    /// Converts a validated payload.
    ///
    /// Fails instead of returning anything partial when the converted object
    /// does not have the exact shape of the group's result record.
    pub fn convert(group: TariffGroup, payload: EnginePayload) -> Result<DimensioningResults> {
        let raw = payload.into_value();
        check_group_marker(group, &raw)?;

        let foreign_block = match group {
            TariffGroup::A => GROUP_B_ONLY_BLOCK,
            TariffGroup::B => GROUP_A_ONLY_BLOCK,
        };
        if raw.get(foreign_block).is_some() {
            return Err(SizerError::TariffGroupMismatch {
                expected: group.to_string(),
                found: other_group(group).to_string(),
            });
        }

        let converted = to_domain_casing(raw);
        let results = match group {
            TariffGroup::A => serde_json::from_value::<GroupAResult>(converted)
                .map(DimensioningResults::GroupA),
            TariffGroup::B => serde_json::from_value::<GroupBResult>(converted)
                .map(DimensioningResults::GroupB),
        }
        .map_err(|e| {
            SizerError::structural(format!(
                "reply does not match the group {} result shape: {}",
                group, e
            ))
        })?;

        debug!(group = %group, "Engine reply converted");
        Ok(results)
    }
}

fn other_group(group: TariffGroup) -> TariffGroup {
    match group {
        TariffGroup::A => TariffGroup::B,
        TariffGroup::B => TariffGroup::A,
    }
}

/// Some engine versions echo the group; when they do it must agree.
fn check_group_marker(group: TariffGroup, raw: &Value) -> Result<()> {
    let marker = raw
        .get("tariff_group")
        .or_else(|| raw.get("grupo"))
        .and_then(Value::as_str)
        .map(|s| s.trim().trim_start_matches("grupo_").to_ascii_uppercase());
    match marker {
        Some(found) if found != group.to_string() => Err(SizerError::TariffGroupMismatch {
            expected: group.to_string(),
            found,
        }),
        _ => Ok(()),
    }
}

fn is_present(value: Option<&Value>) -> bool {
    value.is_some_and(|v| !v.is_null())
}

fn require_object(raw: &Value, block: &str, missing: &mut Vec<String>) {
    if !raw.get(block).is_some_and(Value::is_object) {
        missing.push(block.to_string());
    }
}

fn require_fields(raw: &Value, block: &str, fields: &[&str], missing: &mut Vec<String>) {
    match raw.get(block) {
        Some(Value::Object(map)) => {
            for field in fields {
                if !is_present(map.get(*field)) {
                    missing.push(format!("{}.{}", block, field));
                }
            }
        }
        _ => missing.push(block.to_string()),
    }
}

fn require_non_empty_array(raw: &Value, block: &str, missing: &mut Vec<String>) {
    let ok = raw
        .get(block)
        .and_then(Value::as_array)
        .is_some_and(|rows| !rows.is_empty());
    if !ok {
        missing.push(block.to_string());
    }
}

fn check_sensitivity(raw: &Value, missing: &mut Vec<String>) {
    let Some(block) = raw.get(GROUP_A_ONLY_BLOCK).filter(|b| b.is_object()) else {
        missing.push(GROUP_A_ONLY_BLOCK.to_string());
        return;
    };
    let multipliers = block.get("tariff_multipliers").and_then(Value::as_array);
    let npvs = block.get("npv_values").and_then(Value::as_array);
    match (multipliers, npvs) {
        (Some(m), Some(n)) if m.len() == n.len() => {}
        (Some(_), Some(_)) => missing.push(format!(
            "{}.tariff_multipliers/npv_values (equal length)",
            GROUP_A_ONLY_BLOCK
        )),
        (m, n) => {
            if m.is_none() {
                missing.push(format!("{}.tariff_multipliers", GROUP_A_ONLY_BLOCK));
            }
            if n.is_none() {
                missing.push(format!("{}.npv_values", GROUP_A_ONLY_BLOCK));
            }
        }
    }
}
