//! Calculation request assembled from a session.

use crate::dimensioning::{DimensioningSession, MonthlySeries, TariffGroup, TariffRates};
use crate::engineering::LossesEngine;
use crate::error::{Result, SizerError};
use serde::{Deserialize, Serialize};

/// Consumption series for the customer's tariff group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConsumptionInput {
    GroupA {
        #[serde(rename = "peakKwh")]
        peak_kwh: MonthlySeries,
        #[serde(rename = "offPeakKwh")]
        off_peak_kwh: MonthlySeries,
    },
    GroupB {
        #[serde(rename = "monthlyKwh")]
        monthly_kwh: MonthlySeries,
    },
}

/// Everything the calculation engine needs, in domain casing.
///
/// Converted to engine casing only at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    pub tariff_group: TariffGroup,
    pub consumption: ConsumptionInput,
    pub latitude: f64,
    pub longitude: f64,
    pub irradiance: Vec<f64>,
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
    pub module_power_w: f64,
    pub module_count: u32,
    pub system_power_kwp: f64,
    pub inverter_power_kw: f64,
    /// Total monthly loss percentages.
    pub monthly_losses_percent: MonthlySeries,
    pub investment: f64,
    pub tariffs: TariffRates,
    pub analysis_years: u32,
    pub discount_rate_percent: f64,
    pub tariff_escalation_percent: f64,
}

impl CalculationRequest {
    /// Builds the request for the session's tariff group.
    ///
    /// Only bills of that group contribute consumption.
    pub fn from_session(session: &DimensioningSession) -> Result<Self> {
        let group = session.tariff_group();
        let energy = &session.energy;
        if !energy.has_consumption_for(group) {
            return Err(SizerError::structural(format!(
                "no consumption bills for group {}",
                group
            )));
        }
        let consumption = match group {
            TariffGroup::A => {
                let (peak_kwh, off_peak_kwh) = energy.group_a_totals();
                ConsumptionInput::GroupA {
                    peak_kwh,
                    off_peak_kwh,
                }
            }
            TariffGroup::B => ConsumptionInput::GroupB {
                monthly_kwh: energy.group_b_totals(),
            },
        };

        let (latitude, longitude) = session
            .location
            .coordinates()
            .ok_or_else(|| SizerError::structural("session has no installation coordinates"))?;
        let module = session
            .system
            .module
            .as_ref()
            .ok_or_else(|| SizerError::structural("session has no PV module selected"))?;

        let losses = LossesEngine::monthly(&session.system.losses, latitude);
        let budget = &session.budget;

        Ok(Self {
            tariff_group: group,
            consumption,
            latitude,
            longitude,
            irradiance: session.location.irradiance.clone(),
            tilt_deg: session.location.tilt_deg,
            azimuth_deg: session.location.azimuth_deg,
            module_power_w: module.power_w,
            module_count: session.system.module_count,
            system_power_kwp: session.system.peak_power_kwp(),
            inverter_power_kw: session.system.inverter_ac_power_kw(),
            monthly_losses_percent: losses.total,
            investment: budget.total_investment(),
            tariffs: energy.tariffs.clone(),
            analysis_years: budget.analysis_years,
            discount_rate_percent: budget.discount_rate_percent,
            tariff_escalation_percent: energy.tariffs.annual_increase_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::casing::to_engine_casing;
    use crate::dimensioning::{GroupABill, GroupBBill, ModuleRef};

    fn located_session() -> DimensioningSession {
        let mut session = DimensioningSession::new();
        session.location.latitude = Some(-23.55);
        session.location.longitude = Some(-46.63);
        session.location.irradiance = vec![5.0; 12];
        session.system.module = Some(ModuleRef {
            id: "m1".into(),
            manufacturer: "Acme".into(),
            model: "550M".into(),
            power_w: 550.0,
        });
        session.system.module_count = 20;
        session.budget.equipment_cost = 35_000.0;
        session
    }

    #[test]
    fn test_group_b_sums_only_group_b_bills() {
        let mut session = located_session();
        session.energy.group_b_bills = vec![
            GroupBBill {
                name: "house".into(),
                monthly_kwh: [500.0; 12],
            },
            GroupBBill {
                name: "shed".into(),
                monthly_kwh: [100.0; 12],
            },
        ];
        session.energy.group_a_bills = vec![GroupABill {
            name: "ignored".into(),
            peak_kwh: [9_999.0; 12],
            off_peak_kwh: [9_999.0; 12],
        }];

        let request = CalculationRequest::from_session(&session).unwrap();
        assert_eq!(
            request.consumption,
            ConsumptionInput::GroupB {
                monthly_kwh: [600.0; 12]
            }
        );
        assert!((request.system_power_kwp - 11.0).abs() < 1e-9);
        assert_eq!(request.investment, 35_000.0);
        assert_eq!(request.analysis_years, 25);
    }

    #[test]
    fn test_missing_group_bills_is_structural() {
        let mut session = located_session();
        session.customer.tariff_group = TariffGroup::A;
        session.energy.group_b_bills = vec![GroupBBill {
            name: "house".into(),
            monthly_kwh: [500.0; 12],
        }];

        let err = CalculationRequest::from_session(&session).unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("no consumption bills for group A"));
    }

    #[test]
    fn test_engine_casing_of_request() {
        let mut session = located_session();
        session.energy.group_b_bills = vec![GroupBBill {
            name: "house".into(),
            monthly_kwh: [500.0; 12],
        }];
        let request = CalculationRequest::from_session(&session).unwrap();
        let value = to_engine_casing(serde_json::to_value(&request).unwrap());

        assert!(value.get("system_power_kwp").is_some());
        assert!(value["consumption"].get("monthly_kwh").is_some());
        assert_eq!(value["tariffs"]["annual_increase_percent"], 5.0);
    }
}
