//! File-backed local resume store.
//!
//! The whole state lives in one JSON document:
//!
//! ```json
//! { "continuePrevious": true, "savedAt": "2026-...", "session": { ... } }
//! ```
//!
//! Writes go to a sibling `.tmp` file and are renamed into place, so a crash
//! mid-write never leaves a truncated snapshot behind.

use crate::paths::SizerPaths;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pvsizer_core::dimensioning::{DimensioningSession, LocalSessionStore};
use pvsizer_core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResumeDocument {
    #[serde(default)]
    continue_previous: bool,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    session: Option<DimensioningSession>,
}

/// `LocalSessionStore` writing to `<dir>/session.json`.
pub struct FileLocalSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the document.
    lock: Mutex<()>,
}

impl FileLocalSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_file(SizerPaths::snapshot_file_in(dir.as_ref()))
    }

    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<ResumeDocument> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ResumeDocument::default());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(ResumeDocument::default());
        }
        match serde_json::from_str(&content) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                // An unreadable snapshot must not block starting fresh.
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable resume file");
                Ok(ResumeDocument::default())
            }
        }
    }

    async fn write_document(&self, doc: &ResumeDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl LocalSessionStore for FileLocalSessionStore {
    async fn save_snapshot(&self, session: &DimensioningSession) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        doc.session = Some(session.clone());
        doc.saved_at = Some(Utc::now());
        self.write_document(&doc).await?;
        debug!(revision = session.revision, "Local snapshot written");
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<Option<DimensioningSession>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.session)
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn continue_previous(&self) -> Result<bool> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.continue_previous)
    }

    async fn set_continue_previous(&self, value: bool) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        doc.continue_previous = value;
        self.write_document(&doc).await
    }
}
