//! Shared reqwest helpers: bearer auth and failure classification.

use pvsizer_core::error::NetworkError;
use reqwest::{RequestBuilder, Response};
use std::time::Duration;

/// Error bodies longer than this are cut before landing in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Adds `Authorization: Bearer <token>` when a token is configured.
pub fn with_bearer(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Maps a failed `send()` to the network taxonomy.
pub fn classify_send_error(err: &reqwest::Error, url: &str, timeout: Duration) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
            seconds: timeout.as_secs(),
        }
    } else if err.is_connect() {
        NetworkError::ConnectionRefused {
            url: url.to_string(),
        }
    } else {
        NetworkError::Transport(err.to_string())
    }
}

/// Passes 2xx responses through, turns anything else into `HttpStatus`.
pub async fn ensure_success(response: Response) -> Result<Response, NetworkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(NetworkError::http_status(status.as_u16(), truncate(body)))
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundary() {
        let body = "ã".repeat(400);
        let cut = truncate(body);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= MAX_ERROR_BODY + 3);
    }
}
