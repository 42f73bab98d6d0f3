use anyhow::{Context, Result};
use pvsizer_core::config::SizerConfig;
use pvsizer_core::dimensioning::DimensioningSession;
use pvsizer_infrastructure::{ConfigService, FileLocalSessionStore, SizerPaths};
use std::path::Path;

/// Reads a session from a JSON file, as written by the backend or the local store.
pub fn read_session(path: &Path) -> Result<DimensioningSession> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a dimensioning session", path.display()))
}

/// Loads the config file with environment overrides applied.
pub fn load_config() -> Result<SizerConfig> {
    let service = ConfigService::new()?;
    Ok(service.load()?)
}

pub fn local_store(config: &SizerConfig) -> Result<FileLocalSessionStore> {
    let dir = SizerPaths::storage_dir(config.storage.dir.as_deref())?;
    Ok(FileLocalSessionStore::new(dir))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
