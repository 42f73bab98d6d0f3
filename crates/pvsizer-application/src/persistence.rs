//! Debounced, non-overlapping persistence of the active session.

use pvsizer_core::dimensioning::{
    DimensioningState, ProjectRecord, ProjectRepository, SaveCompletion,
};
use pvsizer_core::error::Result;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// The session aggregate shared between the workflow and its services.
pub type SharedState = Arc<Mutex<DimensioningState>>;

/// Where the coordinator is in its save cycle.
#[derive(Debug)]
enum Phase {
    Idle,
    /// A timer task will start a save when the quiet period ends.
    Scheduled {
        timer: JoinHandle<()>,
        generation: u64,
    },
    /// A save is executing; `pending` records requests that arrived meanwhile.
    InFlight { pending: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The backend confirmed the save under this project id.
    Saved { id: String },
    /// The session was clean.
    NothingToSave,
    /// A save was already running; the request will be honored when it ends.
    Coalesced,
    /// The session was reset or replaced while its save ran; nothing of the
    /// current session was saved.
    Superseded,
}

struct Inner {
    state: SharedState,
    repository: Arc<dyn ProjectRepository>,
    quiet_period: Duration,
    phase: StdMutex<Phase>,
    generation: StdMutex<u64>,
}

/// Owns the debounce timer and the in-flight guard for remote saves.
///
/// Transitions:
///
/// ```text
/// Idle      --auto_save--> Scheduled
/// Scheduled --auto_save--> Scheduled (timer restarted)
/// Scheduled --timer------> InFlight
/// InFlight  --auto_save--> InFlight (pending)
/// InFlight  --done-------> InFlight again if dirty or pending, else Idle
/// InFlight  --cancel-----> InFlight (pending dropped)
/// ```
#[derive(Clone)]
pub struct PersistenceCoordinator {
    inner: Arc<Inner>,
}

impl PersistenceCoordinator {
    pub fn new(
        state: SharedState,
        repository: Arc<dyn ProjectRepository>,
        quiet_period: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state,
                repository,
                quiet_period,
                phase: StdMutex::new(Phase::Idle),
                generation: StdMutex::new(0),
            }),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.inner.quiet_period
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(*self.phase(), Phase::Scheduled { .. })
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(*self.phase(), Phase::InFlight { .. })
    }

    /// Requests a save after the quiet period.
    ///
    /// Restarts the timer when one is already running; marks the in-flight
    /// save as having a pending follow-up instead of starting a second one.
    pub fn auto_save(&self) {
        let mut phase = self.phase();
        match &mut *phase {
            Phase::InFlight { pending } => {
                *pending = true;
                debug!("Save in flight, coalescing request");
            }
            Phase::Scheduled { timer, .. } => {
                timer.abort();
                *phase = self.schedule();
                debug!("Save rescheduled");
            }
            Phase::Idle => {
                *phase = self.schedule();
                debug!(quiet_ms = self.inner.quiet_period.as_millis() as u64, "Save scheduled");
            }
        }
    }

    /// Saves immediately, skipping the quiet period.
    ///
    /// Still respects the in-flight guard: while a save runs this only marks
    /// a follow-up and returns `SaveOutcome::Coalesced`.
    pub async fn save_now(&self) -> Result<SaveOutcome> {
        {
            let mut phase = self.phase();
            match &mut *phase {
                Phase::InFlight { pending } => {
                    *pending = true;
                    return Ok(SaveOutcome::Coalesced);
                }
                Phase::Scheduled { timer, .. } => {
                    timer.abort();
                    self.bump_generation();
                }
                Phase::Idle => {}
            }
            *phase = Phase::InFlight { pending: false };
        }
        self.run_save().await
    }

    /// Drops a scheduled save and any follow-up queued behind the in-flight
    /// one. The in-flight request itself runs to completion.
    pub fn cancel(&self) {
        let mut phase = self.phase();
        match &mut *phase {
            Phase::Scheduled { timer, .. } => {
                timer.abort();
                self.bump_generation();
                *phase = Phase::Idle;
                debug!("Scheduled save cancelled");
            }
            Phase::InFlight { pending } => {
                *pending = false;
            }
            Phase::Idle => {}
        }
    }

    fn phase(&self) -> MutexGuard<'_, Phase> {
        // A poisoned lock only means a panic elsewhere; the phase value is still valid.
        self.inner
            .phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn bump_generation(&self) -> u64 {
        let mut generation = self
            .inner
            .generation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *generation += 1;
        *generation
    }

    /// Spawns the timer task. Caller holds the phase lock.
    fn schedule(&self) -> Phase {
        let generation = self.bump_generation();
        let this = self.clone();
        let quiet_period = self.inner.quiet_period;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            this.fire(generation).await;
        });
        Phase::Scheduled { timer, generation }
    }

    async fn fire(&self, generation: u64) {
        {
            let mut phase = self.phase();
            match &*phase {
                Phase::Scheduled { generation: current, .. } if *current == generation => {
                    *phase = Phase::InFlight { pending: false };
                }
                // Superseded by a newer timer or a manual save.
                _ => return,
            }
        }
        match self.run_save().await {
            Ok(outcome) => debug!(?outcome, "Debounced save finished"),
            Err(e) => warn!(error = %e, "Debounced save failed, session stays dirty"),
        }
    }

    /// Runs saves until the session is clean or a save fails.
    /// Caller must have moved the phase to `InFlight`.
    async fn run_save(&self) -> Result<SaveOutcome> {
        let mut last_id: Option<String> = None;
        loop {
            let ticket = self.inner.state.lock().await.begin_save();
            let Some(ticket) = ticket else {
                *self.phase() = Phase::Idle;
                return Ok(match last_id {
                    Some(id) => SaveOutcome::Saved { id },
                    None => SaveOutcome::NothingToSave,
                });
            };

            let record = ProjectRecord::from_session(&ticket.snapshot);
            info!(revision = ticket.revision, "Save started");
            let result = match ticket.snapshot.id.as_deref() {
                Some(id) => self.inner.repository.update(id, &record).await,
                None => self.inner.repository.create(&record).await,
            };

            match result {
                Ok(receipt) => {
                    let id = receipt.id.clone();
                    let completion = self
                        .inner
                        .state
                        .lock()
                        .await
                        .complete_save(&ticket, receipt);
                    info!(id = %id, revision = ticket.revision, "Save succeeded");

                    let mut phase = self.phase();
                    let pending = matches!(*phase, Phase::InFlight { pending: true });
                    match completion {
                        SaveCompletion::Superseded if !pending => {
                            debug!(id = %id, "Session replaced during the save, receipt discarded");
                            *phase = Phase::Idle;
                            return Ok(SaveOutcome::Superseded);
                        }
                        SaveCompletion::Superseded => {
                            debug!("Session replaced during the save, saving the new one");
                            last_id = None;
                        }
                        SaveCompletion::Clean if !pending => {
                            *phase = Phase::Idle;
                            return Ok(SaveOutcome::Saved { id });
                        }
                        SaveCompletion::Clean | SaveCompletion::Dirty => {
                            debug!("Mutations landed during the save, saving again");
                            last_id = Some(id);
                        }
                    }
                    *phase = Phase::InFlight { pending: false };
                }
                Err(e) => {
                    self.inner.state.lock().await.fail_save(&ticket);
                    error!(error = %e, revision = ticket.revision, "Save failed");
                    let mut phase = self.phase();
                    let pending = matches!(*phase, Phase::InFlight { pending: true });
                    *phase = Phase::Idle;
                    drop(phase);
                    if pending {
                        self.auto_save();
                    }
                    return Err(e);
                }
            }
        }
    }
}
