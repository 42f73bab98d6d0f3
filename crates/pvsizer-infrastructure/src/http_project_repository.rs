//! `ProjectRepository` over the project backend's REST API.
//!
//! - create: `POST {base}/projects`
//! - update: `PUT {base}/projects/{id}`
//! - load: `GET {base}/projects/{id}`
//!
//! Replies may be a `{success, data}` envelope or the bare object.

use crate::http::{classify_send_error, ensure_success, with_bearer};
use async_trait::async_trait;
use pvsizer_core::config::BackendConfig;
use pvsizer_core::dimensioning::{
    DimensioningSession, ProjectRecord, ProjectRepository, SaveReceipt,
};
use pvsizer_core::error::{NetworkError, Result, SizerError};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpProjectRepository {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpProjectRepository {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            timeout: BACKEND_TIMEOUT,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.base_url.clone(), config.token.clone())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn projects_url(&self) -> String {
        format!("{}/projects", self.base_url)
    }

    fn project_url(&self, id: &str) -> String {
        format!("{}/projects/{}", self.base_url, id)
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<Value> {
        let response = with_bearer(request.timeout(self.timeout), self.token.as_deref())
            .send()
            .await
            .map_err(|e| classify_send_error(&e, url, self.timeout))?;
        let response = ensure_success(response).await?;
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| NetworkError::Transport(format!("unreadable backend reply: {}", e)))?;
        Ok(body)
    }
}

/// Unwraps `{success, data}` when present.
fn unwrap_envelope(body: Value) -> Result<Value> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("error")
            .or_else(|| body.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("no error message");
        return Err(SizerError::internal(format!(
            "project backend reported failure: {}",
            message
        )));
    }
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            Ok(map.remove("data").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

fn parse_receipt(body: Value) -> Result<SaveReceipt> {
    Ok(serde_json::from_value(unwrap_envelope(body)?)?)
}

#[async_trait]
impl ProjectRepository for HttpProjectRepository {
    async fn create(&self, record: &ProjectRecord) -> Result<SaveReceipt> {
        let url = self.projects_url();
        let body = self.send(self.client.post(&url).json(record), &url).await?;
        let receipt = parse_receipt(body)?;
        if receipt.id.is_empty() {
            return Err(SizerError::structural("project created without an id"));
        }
        info!(id = %receipt.id, "Project created");
        Ok(receipt)
    }

    async fn update(&self, id: &str, record: &ProjectRecord) -> Result<SaveReceipt> {
        let url = self.project_url(id);
        let body = self.send(self.client.put(&url).json(record), &url).await?;
        let mut receipt = parse_receipt(body)?;
        if receipt.id.is_empty() {
            receipt.id = id.to_string();
        }
        debug!(id = %receipt.id, "Project updated");
        Ok(receipt)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<DimensioningSession>> {
        let url = self.project_url(id);
        let body = match self.send(self.client.get(&url), &url).await {
            Ok(body) => body,
            Err(SizerError::Network(NetworkError::HttpStatus { status, .. }))
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let mut project = unwrap_envelope(body)?;
        let payload = project
            .get_mut("payload")
            .map(Value::take)
            .ok_or_else(|| SizerError::structural(format!("project {} has no payload", id)))?;
        let mut session: DimensioningSession = serde_json::from_value(payload)?;
        session.id = Some(id.to_string());
        Ok(Some(session))
    }
}
