//! The dimensioning aggregate root.

use super::model::{DimensioningSession, DomainKind, Step};
use super::patch::DomainPatch;
use super::repository::SaveReceipt;
use super::step_gate::{StepGate, Violation};
use crate::error::{Result, SizerError};
use crate::results::DimensioningResults;
use serde::Serialize;
use tracing::debug;

/// What the current step allows, derived from the completed-step set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub current: Step,
    pub can_go_next: bool,
    pub can_go_back: bool,
}

/// How a finished save left the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveCompletion {
    /// Nothing changed while the save was in flight.
    Clean,
    /// Mutations landed during the save; another one is due.
    Dirty,
    /// The session was reset or replaced; the receipt belongs to the old one.
    Superseded,
}

/// Snapshot handed to the persistence layer when a save starts.
#[derive(Debug, Clone)]
pub struct SaveTicket {
    /// Session revision the snapshot was taken at.
    pub revision: u64,
    /// Session lifetime the snapshot belongs to; changes on reset/load.
    pub epoch: u64,
    pub snapshot: DimensioningSession,
}

/// Holds one dimensioning session and applies every mutation to it.
///
/// Each mutation re-runs `StepGate` for the active step and for the step that
/// owns the mutated domain, so the completed-step set is never stale.
#[derive(Debug, Clone, Default)]
pub struct DimensioningState {
    session: DimensioningSession,
    epoch: u64,
}

impl DimensioningState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a previously saved session. The loaded data counts as clean.
    pub fn from_session(mut session: DimensioningSession) -> Self {
        session.is_dirty = false;
        session.is_saving = false;
        Self { session, epoch: 0 }
    }

    pub fn session(&self) -> &DimensioningSession {
        &self.session
    }

    pub fn current_step(&self) -> Step {
        self.session.current_step
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // ============================================================================
    // Mutation
    // ============================================================================

    /// Merges a partial update into one domain.
    ///
    /// Returns the active step's violations after the update.
    pub fn update_domain(&mut self, patch: DomainPatch) -> Vec<Violation> {
        let kind = patch.kind();
        let previous_group = self.session.tariff_group();
        patch.apply_to(&mut self.session);

        if self.session.tariff_group() != previous_group && self.session.results.is_some() {
            debug!(
                from = %previous_group,
                to = %self.session.tariff_group(),
                "Tariff group changed, dropping results of the old group"
            );
            self.session.results = None;
        }

        self.mark_mutated(kind)
    }

    /// Renames the session. Counts as a customer-step mutation.
    pub fn set_name(&mut self, name: impl Into<String>) -> Vec<Violation> {
        self.session.name = name.into();
        self.mark_mutated(DomainKind::Customer)
    }

    /// Stores a calculation result, which must match the session's tariff group.
    pub fn set_results(&mut self, results: DimensioningResults) -> Result<()> {
        let expected = self.session.tariff_group();
        if results.tariff_group() != expected {
            return Err(SizerError::TariffGroupMismatch {
                expected: expected.to_string(),
                found: results.tariff_group().to_string(),
            });
        }
        self.session.results = Some(results);
        self.mark_mutated(DomainKind::Results);
        Ok(())
    }

    fn mark_mutated(&mut self, kind: DomainKind) -> Vec<Violation> {
        self.session.revision += 1;
        self.session.is_dirty = true;

        let owning = kind.owning_step();
        let active = self.session.current_step;
        if owning != active {
            self.revalidate(owning);
        }
        self.revalidate(active)
    }

    /// Runs the gate for `step` and records the outcome in the completed set.
    pub fn revalidate(&mut self, step: Step) -> Vec<Violation> {
        let violations = StepGate::validate(step, &self.session);
        if violations.is_empty() {
            self.session.completed_steps.insert(step);
        } else {
            self.session.completed_steps.remove(&step);
        }
        violations
    }

    /// Violations of the active step, without touching the completed set.
    pub fn current_violations(&self) -> Vec<Violation> {
        StepGate::validate(self.session.current_step, &self.session)
    }

    // ============================================================================
    // Navigation
    // ============================================================================

    /// Whether `step` can be entered from the current state.
    pub fn can_go_to(&self, step: Step) -> bool {
        step <= self.session.current_step
            || step
                .predecessors()
                .all(|s| self.session.completed_steps.contains(&s))
    }

    /// Moves the cursor to step `n`.
    ///
    /// Backward moves always succeed. A forward move past an incomplete step
    /// is refused and leaves the state unchanged.
    pub fn go_to_step(&mut self, n: u8) -> bool {
        let Some(target) = Step::from_number(n) else {
            return false;
        };
        if !self.can_go_to(target) {
            debug!(target = %target, "Forward navigation refused");
            return false;
        }
        self.session.current_step = target;
        true
    }

    /// Validates the current step and advances when it is complete.
    pub fn next_step(&mut self) -> bool {
        let current = self.session.current_step;
        self.revalidate(current);
        match current.next() {
            Some(next) => self.go_to_step(next.number()),
            None => false,
        }
    }

    pub fn previous_step(&mut self) -> bool {
        match self.session.current_step.previous() {
            Some(previous) => {
                self.session.current_step = previous;
                true
            }
            None => false,
        }
    }

    pub fn navigation(&self) -> Navigation {
        let current = self.session.current_step;
        Navigation {
            current,
            can_go_next: current.next().is_some() && self.session.is_step_completed(current),
            can_go_back: current.previous().is_some(),
        }
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Replaces the session with a fresh one.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.session = DimensioningSession::new();
    }

    /// Replaces the session with a saved one.
    pub fn load(&mut self, mut session: DimensioningSession) {
        self.epoch += 1;
        session.is_dirty = false;
        session.is_saving = false;
        self.session = session;
    }

    /// Replaces the session with a local resume snapshot.
    ///
    /// Unlike `load`, unsaved edits in the snapshot stay dirty.
    pub fn resume(&mut self, mut session: DimensioningSession) {
        self.epoch += 1;
        session.is_saving = false;
        self.session = session;
    }

    // ============================================================================
    // Save bookkeeping
    // ============================================================================

    /// Takes the snapshot for a save, or `None` when there is nothing to save.
    pub fn begin_save(&mut self) -> Option<SaveTicket> {
        if !self.session.is_dirty {
            return None;
        }
        self.session.is_saving = true;
        Some(SaveTicket {
            revision: self.session.revision,
            epoch: self.epoch,
            snapshot: self.session.clone(),
        })
    }

    /// Applies a successful save.
    ///
    /// A receipt for a session that was reset or replaced since the save
    /// started is discarded and reported as `SaveCompletion::Superseded`.
    pub fn complete_save(
        &mut self,
        ticket: &SaveTicket,
        receipt: SaveReceipt,
    ) -> SaveCompletion {
        if ticket.epoch != self.epoch {
            debug!("Save finished for a superseded session, ignoring receipt");
            return SaveCompletion::Superseded;
        }
        self.session.is_saving = false;
        self.session.id = Some(receipt.id);
        if receipt.created_at.is_some() {
            self.session.created_at = receipt.created_at;
        }
        self.session.updated_at = receipt.updated_at;

        if self.session.revision == ticket.revision {
            self.session.is_dirty = false;
            SaveCompletion::Clean
        } else {
            SaveCompletion::Dirty
        }
    }

    /// Records a failed save. The dirty flag stays set.
    pub fn fail_save(&mut self, ticket: &SaveTicket) {
        if ticket.epoch == self.epoch {
            self.session.is_saving = false;
        }
    }
}
