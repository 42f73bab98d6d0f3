use super::model::GroupBResult;
use super::payload::EnginePayload;
use super::translator::ResultTranslator;
use super::DimensioningResults;
use crate::dimensioning::TariffGroup;
use serde_json::{Value, json};

fn metrics() -> Value {
    json!({
        "npv": 41250.0,
        "irr": 18.4,
        "profitability_index": 2.18,
        "simple_payback_years": 6.5,
        "discounted_payback_years": 8.9,
        "lcoe": 0.31,
        "simple_roi": 342.0,
        "total_savings_nominal": 154000.0,
        "total_savings_present_value": 76250.0
    })
}

fn rows() -> (Value, Value) {
    let summary = json!([
        { "year": 1, "generation_kwh": 6100.0, "consumption_kwh": 6000.0, "savings": 4800.0 },
        { "year": 2, "generation_kwh": 6070.0, "consumption_kwh": 6000.0, "savings": 5020.0 }
    ]);
    let cash_flow = json!([
        {
            "year": 0, "inflow": 0.0, "outflow": 35000.0, "net_cash_flow": -35000.0,
            "cumulative_cash_flow": -35000.0, "discounted_cash_flow": -35000.0
        },
        {
            "year": 1, "inflow": 4800.0, "outflow": 350.0, "net_cash_flow": 4450.0,
            "cumulative_cash_flow": -30550.0, "discounted_cash_flow": 4120.4
        }
    ]);
    (summary, cash_flow)
}

pub(crate) fn group_b_reply() -> Value {
    let (summary, cash_flow) = rows();
    json!({
        "initial_sums": {
            "investment": 35000.0,
            "annual_generation_kwh": 6100.0,
            "annual_consumption_kwh": 6000.0,
            "first_year_savings": 4800.0
        },
        "financial_metrics": metrics(),
        "annual_summary": summary,
        "cash_flow": cash_flow,
        "cost_comparison": {
            "cost_without_system": 5400.0,
            "cost_with_system": 600.0,
            "annual_savings": 4800.0
        }
    })
}

pub(crate) fn group_a_reply() -> Value {
    let (summary, cash_flow) = rows();
    json!({
        "initial_sums": {
            "investment": 35000.0,
            "annual_generation_kwh": 6100.0,
            "annual_consumption_kwh": 60000.0,
            "first_year_savings": 4800.0,
            "consumption_peak_kwh": 12000.0,
            "consumption_off_peak_kwh": 48000.0
        },
        "annual_consumption": { "peak_kwh": 12000.0, "off_peak_kwh": 48000.0, "total_kwh": 60000.0 },
        "financial_metrics": metrics(),
        "annual_summary": summary,
        "cash_flow": cash_flow,
        "sensitivity": {
            "tariff_multipliers": [0.8, 0.9, 1.0, 1.1, 1.2],
            "npv_values": [12000.0, 26000.0, 41250.0, 55000.0, 69800.0]
        }
    })
}

pub(crate) fn sample_group_b_result() -> GroupBResult {
    match ResultTranslator::translate(TariffGroup::B, EnginePayload::new(group_b_reply())) {
        Ok(DimensioningResults::GroupB(result)) => result,
        other => panic!("group B fixture did not translate: {:?}", other),
    }
}
