//! Process-local resume store for one-off runs that must not touch the
//! user's resume file.

use async_trait::async_trait;
use pvsizer_core::dimensioning::{DimensioningSession, LocalSessionStore};
use pvsizer_core::error::Result;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct ResumeState {
    continue_previous: bool,
    session: Option<DimensioningSession>,
}

/// `LocalSessionStore` kept in memory and dropped with the process.
#[derive(Debug, Default)]
pub struct MemoryLocalSessionStore {
    state: Mutex<ResumeState>,
}

impl MemoryLocalSessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalSessionStore for MemoryLocalSessionStore {
    async fn save_snapshot(&self, session: &DimensioningSession) -> Result<()> {
        self.state.lock().await.session = Some(session.clone());
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<Option<DimensioningSession>> {
        Ok(self.state.lock().await.session.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.state.lock().await = ResumeState::default();
        Ok(())
    }

    async fn continue_previous(&self) -> Result<bool> {
        Ok(self.state.lock().await.continue_previous)
    }

    async fn set_continue_previous(&self, value: bool) -> Result<()> {
        self.state.lock().await.continue_previous = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_lives_only_in_memory() {
        let store = MemoryLocalSessionStore::new();
        assert!(store.load_snapshot().await.unwrap().is_none());

        let mut session = DimensioningSession::new();
        session.name = "Galpão".to_string();
        store.save_snapshot(&session).await.unwrap();
        store.set_continue_previous(true).await.unwrap();

        assert_eq!(store.load_snapshot().await.unwrap().unwrap().name, "Galpão");
        assert!(store.continue_previous().await.unwrap());

        store.clear().await.unwrap();
        assert!(store.load_snapshot().await.unwrap().is_none());
        assert!(!store.continue_previous().await.unwrap());
    }
}
