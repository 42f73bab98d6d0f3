//! Key-casing transforms between the domain (camelCase) and the calculation
//! engine (snake_case).
//!
//! Only object keys are rewritten; string values are left alone.

use convert_case::{Case, Casing};
use serde_json::{Map, Value};

/// Rewrites every object key, at any depth, to snake_case.
pub fn to_engine_casing(value: Value) -> Value {
    rewrite_keys(value, Case::Snake)
}

/// Rewrites every object key, at any depth, to camelCase.
pub fn to_domain_casing(value: Value) -> Value {
    rewrite_keys(value, Case::Camel)
}

fn rewrite_keys(value: Value, case: Case) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (key.to_case(case), rewrite_keys(inner, case)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| rewrite_keys(item, case))
                .collect(),
        ),
        other => other,
    }
}
