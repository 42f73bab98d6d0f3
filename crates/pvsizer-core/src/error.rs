//! Error types for the dimensioning workflow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse HTTP status classification used in user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBand {
    ClientError,
    ServerError,
    Other,
}

impl StatusBand {
    pub fn from_status(status: u16) -> Self {
        match status {
            400..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => Self::Other,
        }
    }
}

/// Failure contacting the calculation engine or the persistence backend.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkError {
    /// Nothing is listening at the configured address.
    #[error("connection refused by {url}")]
    ConnectionRefused { url: String },

    /// The client-side timeout elapsed before a reply arrived.
    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status} ({band:?}): {body}")]
    HttpStatus {
        status: u16,
        band: StatusBand,
        body: String,
    },

    /// Any other transport-level failure.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl NetworkError {
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            band: StatusBand::from_status(status),
            body: body.into(),
        }
    }

    /// Whether a retry with backoff can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionRefused { .. } | Self::Timeout { .. } | Self::Transport(_) => true,
            Self::HttpStatus { status, band, .. } => {
                *band == StatusBand::ServerError || *status == 429
            }
        }
    }
}

/// A shared error type for the whole workspace.
///
/// Step validation failures are deliberately absent: they are returned as
/// `Violation` values and never travel through this type.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SizerError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound { entity_type: String, id: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP failure talking to the engine or the backend
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Engine reply is missing a required block or has the wrong shape
    #[error("Malformed calculation result: {0}")]
    Structural(String),

    /// Result variant does not match the customer's tariff group
    #[error("Tariff group mismatch: expected group {expected}, got group {found}")]
    TariffGroupMismatch { expected: String, found: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SizerError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Structural error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_) | Self::TariffGroupMismatch { .. })
    }

    /// Network failures that are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(err) => err.is_retryable(),
            _ => false,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SizerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SizerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SizerError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for SizerError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (binaries and glue code)
impl From<anyhow::Error> for SizerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<String> for SizerError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, SizerError>`.
pub type Result<T> = std::result::Result<T, SizerError>;
