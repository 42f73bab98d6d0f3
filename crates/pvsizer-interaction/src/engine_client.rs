//! HTTP client for the calculation engine.

use crate::retry::{RetryPolicy, run_with_retry};
use async_trait::async_trait;
use pvsizer_core::calculation::{CalculationEngine, CalculationRequest};
use pvsizer_core::casing::to_engine_casing;
use pvsizer_core::config::EngineConfig;
use pvsizer_core::dimensioning::TariffGroup;
use pvsizer_core::error::{NetworkError, Result};
use pvsizer_core::results::EnginePayload;
use pvsizer_infrastructure::http::{classify_send_error, ensure_success};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// `CalculationEngine` backed by the engine's group endpoints
/// (`{base}/calculate-grupo-a`, `{base}/calculate-grupo-b`).
pub struct HttpCalculationEngine {
    client: Client,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpCalculationEngine {
    pub fn new(base_url: impl Into<String>) -> Self {
        let defaults = EngineConfig::default();
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: defaults.timeout(),
            retry: RetryPolicy::from(&defaults.retry),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.base_url.clone())
            .with_timeout(config.timeout())
            .with_retry(RetryPolicy::from(&config.retry))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self, group: TariffGroup) -> String {
        let suffix = match group {
            TariffGroup::A => "a",
            TariffGroup::B => "b",
        };
        format!("{}/calculate-grupo-{}", self.base_url, suffix)
    }

    async fn post_once(&self, url: &str, body: &Value, request_id: &str) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .header(REQUEST_ID_HEADER, request_id)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| classify_send_error(&e, url, self.timeout))?;
        let response = ensure_success(response).await?;
        let reply = response
            .json::<Value>()
            .await
            .map_err(|e| NetworkError::Transport(format!("unreadable engine reply: {}", e)))?;
        Ok(reply)
    }
}

#[async_trait]
impl CalculationEngine for HttpCalculationEngine {
    async fn calculate(
        &self,
        group: TariffGroup,
        request: &CalculationRequest,
    ) -> Result<EnginePayload> {
        let url = self.endpoint(group);
        let body = to_engine_casing(serde_json::to_value(request)?);
        let request_id = Uuid::new_v4().to_string();
        info!(group = %group, request_id = %request_id, "Calculation requested");

        let reply = run_with_retry(&self.retry, "calculate", |attempt| {
            debug!(attempt, url = %url, "Posting calculation request");
            self.post_once(&url, &body, &request_id)
        })
        .await?;

        EnginePayload::from_reply(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_endpoints() {
        let engine = HttpCalculationEngine::new("http://localhost:8000/api/v1/");
        assert_eq!(
            engine.endpoint(TariffGroup::A),
            "http://localhost:8000/api/v1/calculate-grupo-a"
        );
        assert_eq!(
            engine.endpoint(TariffGroup::B),
            "http://localhost:8000/api/v1/calculate-grupo-b"
        );
    }

    #[test]
    fn test_from_config_uses_configured_timeout() {
        let mut config = EngineConfig::default();
        config.timeout_secs = 5;
        config.retry.max_attempts = 1;
        let engine = HttpCalculationEngine::from_config(&config);
        assert_eq!(engine.timeout, Duration::from_secs(5));
        assert_eq!(engine.retry.max_attempts, 1);
    }
}
