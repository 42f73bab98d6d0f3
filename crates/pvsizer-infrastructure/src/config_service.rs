//! Configuration service implementation.
//!
//! Loads `SizerConfig` from `~/.config/pvsizer/config.toml` and applies the
//! `PVSIZER_*` environment overrides on top.

use crate::paths::SizerPaths;
use pvsizer_core::config::SizerConfig;
use pvsizer_core::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads the runtime configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses the default config file location.
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: SizerPaths::config_file()?,
        })
    }

    /// Uses an explicit config file (for testing or a `--config` flag).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file (defaults when missing) and applies process env overrides.
    pub fn load(&self) -> Result<SizerConfig> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Same as `load` with an injectable environment lookup.
    pub fn load_with_env<F>(&self, lookup: F) -> Result<SizerConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.read_file()?;
        config.apply_env_overrides(lookup);
        Ok(config)
    }

    fn read_file(&self) -> Result<SizerConfig> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(SizerConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(SizerConfig::default());
        }
        Ok(toml::from_str(&content)?)
    }
}
