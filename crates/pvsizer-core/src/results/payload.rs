//! The untyped calculation-engine reply.
//!
//! `EnginePayload` is the only place an engine reply lives as raw JSON. It can
//! be inspected by `ResultTranslator` and nothing else turns it into data.

use crate::error::{Result, SizerError};
use serde_json::Value;
use tracing::warn;

/// Top-level block every engine result carries, in engine casing.
pub const RESULT_MARKER_FIELD: &str = "financial_metrics";

/// Raw result object extracted from an engine reply.
#[derive(Debug, Clone)]
pub struct EnginePayload(Value);

impl EnginePayload {
    /// Wraps an already-unwrapped result object.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Extracts the result object from a reply envelope.
    ///
    /// The canonical shape is `{"success": true, "data": {...}}`. A bare
    /// result object and a doubly wrapped envelope are still accepted.
    pub fn from_reply(reply: Value) -> Result<Self> {
        if let Some(message) = failure_message(&reply) {
            return Err(SizerError::structural(format!(
                "calculation engine reported failure: {}",
                message
            )));
        }

        if let Some(data) = reply.get("data")
            && has_marker(data)
        {
            return Ok(Self(data.clone()));
        }

        // Compatibility shim for older engine deployments; remove once every
        // endpoint answers with a single envelope.
        if has_marker(&reply) {
            warn!("Engine reply was not wrapped in an envelope");
            return Ok(Self(reply));
        }
        if let Some(inner) = reply.get("data") {
            if let Some(message) = failure_message(inner) {
                return Err(SizerError::structural(format!(
                    "calculation engine reported failure: {}",
                    message
                )));
            }
            if let Some(data) = inner.get("data")
                && has_marker(data)
            {
                warn!("Engine reply was wrapped in a nested envelope");
                return Ok(Self(data.clone()));
            }
        }

        Err(SizerError::structural(format!(
            "engine reply contains no object with a '{}' block",
            RESULT_MARKER_FIELD
        )))
    }

    pub(crate) fn as_value(&self) -> &Value {
        &self.0
    }

    pub(crate) fn into_value(self) -> Value {
        self.0
    }
}

fn has_marker(value: &Value) -> bool {
    value
        .get(RESULT_MARKER_FIELD)
        .is_some_and(Value::is_object)
}

fn failure_message(value: &Value) -> Option<String> {
    if value.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }
    let message = value
        .get("error")
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("no error message");
    Some(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result_object() -> Value {
        json!({ "financial_metrics": { "npv": 1.0 } })
    }

    #[test]
    fn test_canonical_envelope() {
        let payload =
            EnginePayload::from_reply(json!({ "success": true, "data": result_object() }))
                .unwrap();
        assert_eq!(payload.as_value(), &result_object());
    }

    #[test]
    fn test_bare_and_nested_replies_are_accepted() {
        let bare = EnginePayload::from_reply(result_object()).unwrap();
        assert_eq!(bare.into_value(), result_object());

        let nested = EnginePayload::from_reply(json!({
            "success": true,
            "data": { "success": true, "data": result_object() }
        }))
        .unwrap();
        assert_eq!(nested.into_value(), result_object());
    }

    #[test]
    fn test_failure_envelope_is_structural_error() {
        let err = EnginePayload::from_reply(json!({
            "success": false,
            "error": "irradiance missing"
        }))
        .unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("irradiance missing"));
    }

    #[test]
    fn test_reply_without_marker_is_rejected() {
        let err = EnginePayload::from_reply(json!({ "success": true, "data": { "x": 1 } }))
            .unwrap_err();
        assert!(err.to_string().contains(RESULT_MARKER_FIELD));
    }
}
