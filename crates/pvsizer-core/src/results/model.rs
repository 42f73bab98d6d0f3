//! Typed calculation results, one record per tariff group.

use crate::dimensioning::TariffGroup;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialSums {
    pub investment: f64,
    pub annual_generation_kwh: f64,
    pub annual_consumption_kwh: f64,
    pub first_year_savings: f64,
}

/// Initial sums with the time-of-use consumption split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAInitialSums {
    pub investment: f64,
    pub annual_generation_kwh: f64,
    pub annual_consumption_kwh: f64,
    pub first_year_savings: f64,
    pub consumption_peak_kwh: f64,
    pub consumption_off_peak_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    /// Net present value (VPL), R$.
    pub npv: f64,
    /// Internal rate of return (TIR), percent.
    pub irr: f64,
    pub profitability_index: f64,
    pub simple_payback_years: f64,
    pub discounted_payback_years: f64,
    /// Levelized cost of energy, R$/kWh.
    pub lcoe: f64,
    pub simple_roi: f64,
    pub total_savings_nominal: f64,
    pub total_savings_present_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualSummaryRow {
    pub year: u32,
    pub generation_kwh: f64,
    pub consumption_kwh: f64,
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowRow {
    pub year: u32,
    pub inflow: f64,
    pub outflow: f64,
    pub net_cash_flow: f64,
    pub cumulative_cash_flow: f64,
    pub discounted_cash_flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualConsumption {
    pub peak_kwh: f64,
    pub off_peak_kwh: f64,
    pub total_kwh: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensitivityRaw {
    tariff_multipliers: Vec<f64>,
    npv_values: Vec<f64>,
}

/// NPV outcome for each tariff multiplier.
///
/// Both series always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SensitivityRaw")]
pub struct Sensitivity {
    tariff_multipliers: Vec<f64>,
    npv_values: Vec<f64>,
}

impl Sensitivity {
    pub fn new(tariff_multipliers: Vec<f64>, npv_values: Vec<f64>) -> Result<Self, String> {
        if tariff_multipliers.len() != npv_values.len() {
            return Err(format!(
                "sensitivity arrays differ in length: {} tariff multipliers, {} NPV values",
                tariff_multipliers.len(),
                npv_values.len()
            ));
        }
        Ok(Self {
            tariff_multipliers,
            npv_values,
        })
    }

    pub fn tariff_multipliers(&self) -> &[f64] {
        &self.tariff_multipliers
    }

    pub fn npv_values(&self) -> &[f64] {
        &self.npv_values
    }

    pub fn len(&self) -> usize {
        self.tariff_multipliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tariff_multipliers.is_empty()
    }

    /// (multiplier, npv) pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.tariff_multipliers
            .iter()
            .copied()
            .zip(self.npv_values.iter().copied())
    }
}

impl TryFrom<SensitivityRaw> for Sensitivity {
    type Error = String;

    fn try_from(raw: SensitivityRaw) -> Result<Self, Self::Error> {
        Sensitivity::new(raw.tariff_multipliers, raw.npv_values)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostComparison {
    pub cost_without_system: f64,
    pub cost_with_system: f64,
    pub annual_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAResult {
    pub initial_sums: GroupAInitialSums,
    pub annual_consumption: AnnualConsumption,
    pub financial_metrics: FinancialMetrics,
    pub annual_summary: Vec<AnnualSummaryRow>,
    pub cash_flow: Vec<CashFlowRow>,
    pub sensitivity: Sensitivity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBResult {
    pub initial_sums: InitialSums,
    pub financial_metrics: FinancialMetrics,
    pub annual_summary: Vec<AnnualSummaryRow>,
    pub cash_flow: Vec<CashFlowRow>,
    pub cost_comparison: CostComparison,
}

/// The results domain: exactly one variant, matching the tariff group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tariffGroup")]
pub enum DimensioningResults {
    #[serde(rename = "A")]
    GroupA(GroupAResult),
    #[serde(rename = "B")]
    GroupB(GroupBResult),
}

impl DimensioningResults {
    pub fn tariff_group(&self) -> TariffGroup {
        match self {
            DimensioningResults::GroupA(_) => TariffGroup::A,
            DimensioningResults::GroupB(_) => TariffGroup::B,
        }
    }

    pub fn financial_metrics(&self) -> &FinancialMetrics {
        match self {
            DimensioningResults::GroupA(r) => &r.financial_metrics,
            DimensioningResults::GroupB(r) => &r.financial_metrics,
        }
    }

    pub fn cash_flow(&self) -> &[CashFlowRow] {
        match self {
            DimensioningResults::GroupA(r) => &r.cash_flow,
            DimensioningResults::GroupB(r) => &r.cash_flow,
        }
    }

    pub fn annual_summary(&self) -> &[AnnualSummaryRow] {
        match self {
            DimensioningResults::GroupA(r) => &r.annual_summary,
            DimensioningResults::GroupB(r) => &r.annual_summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sensitivity_rejects_unequal_lengths() {
        assert!(Sensitivity::new(vec![0.8, 1.0], vec![1.0]).is_err());
        let parsed: Result<Sensitivity, _> = serde_json::from_value(json!({
            "tariffMultipliers": [0.8, 1.0, 1.2],
            "npvValues": [1.0, 2.0]
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_sensitivity_points() {
        let s = Sensitivity::new(vec![0.9, 1.1], vec![-100.0, 250.0]).unwrap();
        assert_eq!(s.points().collect::<Vec<_>>(), vec![(0.9, -100.0), (1.1, 250.0)]);
        assert_eq!(s.len(), 2);
    }
}
