//! Path resolution for pvsizer configuration and local session files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/pvsizer/           # Config directory (or PVSIZER_STORAGE_DIR)
//! ├── config.toml              # Runtime configuration
//! └── session.json             # Local resume snapshot
//! ```

use pvsizer_core::config::ENV_STORAGE_DIR;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "pvsizer";
const CONFIG_FILE: &str = "config.toml";
const SNAPSHOT_FILE: &str = "session.json";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find the platform config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for pvsizer_core::SizerError {
    fn from(err: PathError) -> Self {
        pvsizer_core::SizerError::config(err.to_string())
    }
}

/// Unified path management for pvsizer.
pub struct SizerPaths;

impl SizerPaths {
    /// Returns the pvsizer configuration directory.
    ///
    /// `PVSIZER_STORAGE_DIR` wins over the platform default.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        if let Ok(dir) = std::env::var(ENV_STORAGE_DIR)
            && !dir.trim().is_empty()
        {
            return Ok(PathBuf::from(dir));
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Returns the local snapshot path inside `dir`.
    pub fn snapshot_file_in(dir: &Path) -> PathBuf {
        dir.join(SNAPSHOT_FILE)
    }

    /// Resolves the storage directory, honoring an explicit override.
    pub fn storage_dir(configured: Option<&Path>) -> Result<PathBuf, PathError> {
        match configured {
            Some(dir) => Ok(dir.to_path_buf()),
            None => Self::config_dir(),
        }
    }
}
