//! The dimensioning workflow: one session, its stores and its services.

use crate::calculation_service::CalculationService;
use crate::persistence::{PersistenceCoordinator, SaveOutcome, SharedState};
use pvsizer_core::calculation::CalculationEngine;
use pvsizer_core::dimensioning::{
    DimensioningSession, DimensioningState, DomainPatch, LocalSessionStore, Navigation,
    ProjectRepository, Violation,
};
use pvsizer_core::error::{Result, SizerError};
use pvsizer_core::results::DimensioningResults;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Holds the active session and routes every change through it.
///
/// Each mutation is followed by a local snapshot write and, once the session
/// has a remote id, a debounced remote save.
pub struct DimensioningWorkflow {
    state: SharedState,
    repository: Arc<dyn ProjectRepository>,
    local_store: Arc<dyn LocalSessionStore>,
    persistence: PersistenceCoordinator,
    calculation: CalculationService,
}

impl DimensioningWorkflow {
    pub fn new(
        repository: Arc<dyn ProjectRepository>,
        local_store: Arc<dyn LocalSessionStore>,
        engine: Arc<dyn CalculationEngine>,
        quiet_period: Duration,
    ) -> Self {
        let state: SharedState = Arc::new(Mutex::new(DimensioningState::new()));
        let persistence =
            PersistenceCoordinator::new(state.clone(), repository.clone(), quiet_period);
        Self {
            state,
            repository,
            local_store,
            persistence,
            calculation: CalculationService::new(engine),
        }
    }

    /// Read-only copy of the current session.
    pub async fn session(&self) -> DimensioningSession {
        self.state.lock().await.session().clone()
    }

    pub fn persistence(&self) -> &PersistenceCoordinator {
        &self.persistence
    }

    // ============================================================================
    // Mutation
    // ============================================================================

    /// Applies a partial domain update and returns the active step's violations.
    pub async fn update_domain(&self, patch: DomainPatch) -> Vec<Violation> {
        let (violations, snapshot) = {
            let mut state = self.state.lock().await;
            let violations = state.update_domain(patch);
            (violations, state.session().clone())
        };
        self.after_mutation(&snapshot).await;
        violations
    }

    pub async fn set_name(&self, name: impl Into<String>) -> Vec<Violation> {
        let (violations, snapshot) = {
            let mut state = self.state.lock().await;
            let violations = state.set_name(name);
            (violations, state.session().clone())
        };
        self.after_mutation(&snapshot).await;
        violations
    }

    pub async fn current_violations(&self) -> Vec<Violation> {
        self.state.lock().await.current_violations()
    }

    async fn after_mutation(&self, snapshot: &DimensioningSession) {
        self.write_local(snapshot).await;
        if snapshot.id.is_some() {
            self.persistence.auto_save();
        }
    }

    async fn write_local(&self, snapshot: &DimensioningSession) {
        // Local resume is best effort; the in-memory session stays authoritative.
        if let Err(e) = self.local_store.save_snapshot(snapshot).await {
            warn!(error = %e, "Failed to write local snapshot");
        }
    }

    // ============================================================================
    // Navigation
    // ============================================================================

    pub async fn go_to_step(&self, n: u8) -> bool {
        let (moved, snapshot) = {
            let mut state = self.state.lock().await;
            let moved = state.go_to_step(n);
            (moved, state.session().clone())
        };
        if moved {
            self.write_local(&snapshot).await;
        }
        moved
    }

    pub async fn next_step(&self) -> bool {
        let (moved, snapshot) = {
            let mut state = self.state.lock().await;
            let moved = state.next_step();
            (moved, state.session().clone())
        };
        if moved {
            self.write_local(&snapshot).await;
        }
        moved
    }

    pub async fn previous_step(&self) -> bool {
        let (moved, snapshot) = {
            let mut state = self.state.lock().await;
            let moved = state.previous_step();
            (moved, state.session().clone())
        };
        if moved {
            self.write_local(&snapshot).await;
        }
        moved
    }

    pub async fn navigation(&self) -> Navigation {
        self.state.lock().await.navigation()
    }

    // ============================================================================
    // Persistence
    // ============================================================================

    /// Saves now, creating the remote project when the session has no id yet.
    pub async fn save_now(&self) -> Result<SaveOutcome> {
        let outcome = self.persistence.save_now().await?;
        let snapshot = self.session().await;
        self.write_local(&snapshot).await;
        Ok(outcome)
    }

    /// Discards the session and starts an empty one.
    pub async fn reset(&self) -> Result<()> {
        self.persistence.cancel();
        self.state.lock().await.reset();
        self.local_store.clear().await?;
        info!("Session reset");
        Ok(())
    }

    /// Replaces the active session with a saved one.
    pub async fn load_session(&self, session: DimensioningSession) {
        self.persistence.cancel();
        let snapshot = {
            let mut state = self.state.lock().await;
            state.load(session);
            state.session().clone()
        };
        self.write_local(&snapshot).await;
        debug!(id = ?snapshot.id, "Session loaded");
    }

    /// Fetches a project from the backend and makes it the active session.
    pub async fn open_project(&self, id: &str) -> Result<()> {
        let session = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| SizerError::not_found("Project", id))?;
        self.load_session(session).await;
        Ok(())
    }

    /// Resumes the local snapshot when the user chose to continue.
    ///
    /// Returns `true` when a session was resumed. Otherwise the local store
    /// is cleared and the workflow keeps its fresh session.
    pub async fn restore(&self) -> Result<bool> {
        if self.local_store.continue_previous().await? {
            if let Some(snapshot) = self.local_store.load_snapshot().await? {
                let resume_save = snapshot.is_dirty && snapshot.id.is_some();
                self.state.lock().await.resume(snapshot);
                if resume_save {
                    self.persistence.auto_save();
                }
                info!("Previous session resumed");
                return Ok(true);
            }
        }
        self.local_store.clear().await?;
        Ok(false)
    }

    pub async fn set_continue_previous(&self, value: bool) -> Result<()> {
        self.local_store.set_continue_previous(value).await
    }

    // ============================================================================
    // Calculation
    // ============================================================================

    /// Runs the calculation and stores the result in the session.
    pub async fn calculate(&self) -> Result<DimensioningResults> {
        let results = self.calculation.run(&self.state).await?;
        let snapshot = self.session().await;
        self.after_mutation(&snapshot).await;
        Ok(results)
    }
}
