//! Runtime configuration model.
//!
//! Loading and file resolution live in `pvsizer-infrastructure::ConfigService`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_ENGINE_URL: &str = "PVSIZER_ENGINE_URL";
pub const ENV_BACKEND_URL: &str = "PVSIZER_BACKEND_URL";
pub const ENV_BACKEND_TOKEN: &str = "PVSIZER_BACKEND_TOKEN";
pub const ENV_STORAGE_DIR: &str = "PVSIZER_STORAGE_DIR";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SizerConfig {
    pub engine: EngineConfig,
    pub backend: BackendConfig,
    pub autosave: AutosaveConfig,
    pub storage: StorageConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            timeout_secs: 60,
            retry: RetryConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles on each further attempt.
    pub base_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 500,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            token: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AutosaveConfig {
    pub quiet_period_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: 2000,
        }
    }
}

impl AutosaveConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform config directory when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl SizerConfig {
    /// Applies `PVSIZER_*` overrides using the given variable lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_ENGINE_URL) {
            self.engine.base_url = url;
        }
        if let Some(url) = get(ENV_BACKEND_URL) {
            self.backend.base_url = url;
        }
        if let Some(token) = get(ENV_BACKEND_TOKEN) {
            self.backend.token = Some(token);
        }
        if let Some(dir) = get(ENV_STORAGE_DIR) {
            self.storage.dir = Some(PathBuf::from(dir));
        }
    }
}
