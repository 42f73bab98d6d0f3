use async_trait::async_trait;
use pvsizer_application::{DimensioningWorkflow, SaveOutcome};
use pvsizer_core::calculation::{CalculationEngine, CalculationRequest};
use pvsizer_core::dimensioning::{
    BudgetPatch, ClientRef, CustomerPatch, DimensioningSession, DomainPatch, EnergyPatch,
    GroupBBill, InverterSelection, LocalSessionStore, LocationPatch, ModuleRef, ProjectRecord,
    ProjectRepository, SaveReceipt, Step, SystemPatch, TariffGroup,
};
use pvsizer_core::error::{NetworkError, Result, SizerError};
use pvsizer_core::results::{DimensioningResults, EnginePayload};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct MemoryProjectRepository {
    projects: Mutex<HashMap<String, DimensioningSession>>,
    creates: Mutex<usize>,
    updates: Mutex<usize>,
}

impl MemoryProjectRepository {
    fn creates(&self) -> usize {
        *self.creates.lock().unwrap()
    }

    fn updates(&self) -> usize {
        *self.updates.lock().unwrap()
    }

    fn receipt(id: &str) -> SaveReceipt {
        SaveReceipt {
            id: id.to_string(),
            created_at: Some("2026-03-01T10:00:00Z".to_string()),
            updated_at: Some("2026-03-01T10:00:00Z".to_string()),
        }
    }
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn create(&self, record: &ProjectRecord) -> Result<SaveReceipt> {
        let mut creates = self.creates.lock().unwrap();
        *creates += 1;
        let id = format!("proj-{}", *creates);
        self.projects
            .lock()
            .unwrap()
            .insert(id.clone(), record.payload.clone());
        Ok(Self::receipt(&id))
    }

    async fn update(&self, id: &str, record: &ProjectRecord) -> Result<SaveReceipt> {
        *self.updates.lock().unwrap() += 1;
        self.projects
            .lock()
            .unwrap()
            .insert(id.to_string(), record.payload.clone());
        Ok(Self::receipt(id))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<DimensioningSession>> {
        Ok(self.projects.lock().unwrap().get(id).cloned().map(|mut s| {
            s.id = Some(id.to_string());
            s
        }))
    }
}

#[derive(Default)]
struct MemoryLocalStore {
    snapshot: Mutex<Option<DimensioningSession>>,
    continue_previous: Mutex<bool>,
}

#[async_trait]
impl LocalSessionStore for MemoryLocalStore {
    async fn save_snapshot(&self, session: &DimensioningSession) -> Result<()> {
        *self.snapshot.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<Option<DimensioningSession>> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.snapshot.lock().unwrap() = None;
        *self.continue_previous.lock().unwrap() = false;
        Ok(())
    }

    async fn continue_previous(&self) -> Result<bool> {
        Ok(*self.continue_previous.lock().unwrap())
    }

    async fn set_continue_previous(&self, value: bool) -> Result<()> {
        *self.continue_previous.lock().unwrap() = value;
        Ok(())
    }
}

struct FakeEngine {
    /// `None` makes the engine unreachable.
    reply: Mutex<Option<Value>>,
    calls: Mutex<usize>,
}

impl FakeEngine {
    fn replying(reply: Value) -> Self {
        Self {
            reply: Mutex::new(Some(reply)),
            calls: Mutex::new(0),
        }
    }

    fn unavailable() -> Self {
        Self {
            reply: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    fn set_reply(&self, reply: Option<Value>) {
        *self.reply.lock().unwrap() = reply;
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl CalculationEngine for FakeEngine {
    async fn calculate(
        &self,
        _group: TariffGroup,
        _request: &CalculationRequest,
    ) -> Result<EnginePayload> {
        *self.calls.lock().unwrap() += 1;
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Some(reply) => EnginePayload::from_reply(reply),
            None => Err(SizerError::Network(NetworkError::http_status(502, "down"))),
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn group_b_reply() -> Value {
    json!({
        "success": true,
        "data": {
            "initial_sums": {
                "investment": 35000.0, "annual_generation_kwh": 6100.0,
                "annual_consumption_kwh": 6000.0, "first_year_savings": 4800.0
            },
            "financial_metrics": {
                "npv": 41250.0, "irr": 18.4, "profitability_index": 2.18,
                "simple_payback_years": 6.5, "discounted_payback_years": 8.9,
                "lcoe": 0.31, "simple_roi": 342.0,
                "total_savings_nominal": 154000.0, "total_savings_present_value": 76250.0
            },
            "annual_summary": [
                { "year": 1, "generation_kwh": 6100.0, "consumption_kwh": 6000.0, "savings": 4800.0 }
            ],
            "cash_flow": [
                {
                    "year": 0, "inflow": 0.0, "outflow": 35000.0, "net_cash_flow": -35000.0,
                    "cumulative_cash_flow": -35000.0, "discounted_cash_flow": -35000.0
                }
            ],
            "cost_comparison": {
                "cost_without_system": 5400.0, "cost_with_system": 600.0, "annual_savings": 4800.0
            }
        }
    })
}

struct Harness {
    workflow: DimensioningWorkflow,
    repository: Arc<MemoryProjectRepository>,
    local: Arc<MemoryLocalStore>,
    engine: Arc<FakeEngine>,
}

fn harness(engine: FakeEngine) -> Harness {
    let repository = Arc::new(MemoryProjectRepository::default());
    let local = Arc::new(MemoryLocalStore::default());
    let engine = Arc::new(engine);
    let workflow = DimensioningWorkflow::new(
        repository.clone(),
        local.clone(),
        engine.clone(),
        Duration::from_millis(2000),
    );
    Harness {
        workflow,
        repository,
        local,
        engine,
    }
}

/// Fills every step of a Group B session and walks to the results step.
async fn complete_group_b(workflow: &DimensioningWorkflow) {
    workflow.set_name("Padaria Sol").await;
    workflow
        .update_domain(DomainPatch::Customer(CustomerPatch {
            client: Some(Some(ClientRef {
                id: "client-42".to_string(),
                name: "Padaria Sol".to_string(),
                email: None,
            })),
            tariff_group: Some(TariffGroup::B),
            ..Default::default()
        }))
        .await;
    assert!(workflow.next_step().await);

    workflow
        .update_domain(DomainPatch::Energy(EnergyPatch {
            group_b_bills: Some(vec![GroupBBill {
                name: "main".to_string(),
                monthly_kwh: [500.0; 12],
            }]),
            ..Default::default()
        }))
        .await;
    assert!(workflow.next_step().await);

    workflow
        .update_domain(DomainPatch::Location(LocationPatch {
            latitude: Some(Some(-22.9)),
            longitude: Some(Some(-43.2)),
            irradiance: Some(vec![5.2; 12]),
            tilt_deg: Some(20.0),
            ..Default::default()
        }))
        .await;
    assert!(workflow.next_step().await);

    workflow
        .update_domain(DomainPatch::System(SystemPatch {
            module: Some(Some(ModuleRef {
                id: "mod-550".to_string(),
                manufacturer: "Acme Solar".to_string(),
                model: "AS-550".to_string(),
                power_w: 550.0,
            })),
            inverters: Some(vec![InverterSelection {
                id: "inv-5k".to_string(),
                manufacturer: "Acme Power".to_string(),
                model: "AP-5000".to_string(),
                ac_power_w: 5_000.0,
                quantity: 1,
            }]),
            module_count: Some(8),
            ..Default::default()
        }))
        .await;
    assert!(workflow.next_step().await);
    assert!(workflow.next_step().await);

    workflow
        .update_domain(DomainPatch::Budget(BudgetPatch {
            equipment_cost: Some(35_000.0),
            ..Default::default()
        }))
        .await;
    assert!(workflow.next_step().await);
    assert_eq!(workflow.navigation().await.current, Step::Results);
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_calculation_result_is_stored_and_snapshotted() {
    let h = harness(FakeEngine::replying(group_b_reply()));
    complete_group_b(&h.workflow).await;

    let results = h.workflow.calculate().await.unwrap();
    assert!(matches!(results, DimensioningResults::GroupB(_)));

    let session = h.workflow.session().await;
    assert_eq!(session.results, Some(results));
    assert!(session.is_dirty);

    let snapshot = h.local.load_snapshot().await.unwrap().unwrap();
    assert!(snapshot.results.is_some());
    // No remote id yet, so nothing is scheduled.
    assert!(!h.workflow.persistence().is_scheduled());
    assert_eq!(h.repository.creates(), 0);
}

#[tokio::test]
async fn test_engine_failure_without_results_stores_nothing() {
    let h = harness(FakeEngine::unavailable());
    complete_group_b(&h.workflow).await;

    let err = h.workflow.calculate().await.unwrap_err();
    assert!(err.is_retryable());
    assert!(h.workflow.session().await.results.is_none());
}

#[tokio::test]
async fn test_failed_recalculation_keeps_previous_results() {
    let h = harness(FakeEngine::replying(group_b_reply()));
    complete_group_b(&h.workflow).await;
    let first = h.workflow.calculate().await.unwrap();

    // Group B reply without its cost comparison block.
    let mut malformed = group_b_reply();
    malformed["data"]
        .as_object_mut()
        .unwrap()
        .remove("cost_comparison");
    h.engine.set_reply(Some(malformed));
    let err = h.workflow.calculate().await.unwrap_err();
    assert!(err.is_structural());
    assert_eq!(h.workflow.session().await.results.as_ref(), Some(&first));

    h.engine.set_reply(None);
    let err = h.workflow.calculate().await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(h.workflow.session().await.results.as_ref(), Some(&first));

    assert_eq!(h.engine.calls(), 3);
    let snapshot = h.local.load_snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.results, Some(first));
}

#[tokio::test]
async fn test_incomplete_session_cannot_be_calculated() {
    let h = harness(FakeEngine::replying(group_b_reply()));
    let err = h.workflow.calculate().await.unwrap_err();
    assert!(err.is_structural());
}

#[tokio::test]
async fn test_locked_step_is_refused_without_side_effects() {
    let h = harness(FakeEngine::replying(group_b_reply()));
    assert!(!h.workflow.go_to_step(4).await);
    assert_eq!(h.workflow.navigation().await.current, Step::Customer);
    assert!(h.local.load_snapshot().await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_edits_after_first_save_are_auto_saved() {
    let h = harness(FakeEngine::replying(group_b_reply()));
    h.workflow.set_name("Casa").await;

    let outcome = h.workflow.save_now().await.unwrap();
    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            id: "proj-1".to_string()
        }
    );
    assert_eq!(
        h.local.load_snapshot().await.unwrap().unwrap().id.as_deref(),
        Some("proj-1")
    );

    h.workflow.set_name("Casa da praia").await;
    assert!(h.workflow.persistence().is_scheduled());

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(h.repository.creates(), 1);
    assert_eq!(h.repository.updates(), 1);
    assert!(!h.workflow.session().await.is_dirty);
}

#[tokio::test]
async fn test_open_project_loads_clean_session() {
    let h = harness(FakeEngine::replying(group_b_reply()));
    h.workflow.set_name("Galpão").await;
    h.workflow.save_now().await.unwrap();
    h.workflow.reset().await.unwrap();
    assert_eq!(h.workflow.session().await.name, "");

    h.workflow.open_project("proj-1").await.unwrap();
    let session = h.workflow.session().await;
    assert_eq!(session.name, "Galpão");
    assert_eq!(session.id.as_deref(), Some("proj-1"));
    assert!(!session.is_dirty);
}

#[tokio::test]
async fn test_open_unknown_project_is_not_found() {
    let h = harness(FakeEngine::replying(group_b_reply()));
    let err = h.workflow.open_project("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_scheduled_save_and_clears_local_state() {
    let h = harness(FakeEngine::replying(group_b_reply()));
    h.workflow.set_name("Casa").await;
    h.workflow.save_now().await.unwrap();
    h.workflow.set_name("Casa 2").await;
    assert!(h.workflow.persistence().is_scheduled());

    h.workflow.reset().await.unwrap();
    assert!(!h.workflow.persistence().is_scheduled());
    assert!(h.local.load_snapshot().await.unwrap().is_none());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(h.repository.updates(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_restore_resumes_dirty_snapshot_and_saves_it() {
    let h = harness(FakeEngine::replying(group_b_reply()));
    let mut snapshot = DimensioningSession::new();
    snapshot.id = Some("proj-7".to_string());
    snapshot.name = "Resumed".to_string();
    snapshot.is_dirty = true;
    snapshot.revision = 4;
    h.local.save_snapshot(&snapshot).await.unwrap();
    h.local.set_continue_previous(true).await.unwrap();

    assert!(h.workflow.restore().await.unwrap());
    let session = h.workflow.session().await;
    assert_eq!(session.name, "Resumed");
    assert!(session.is_dirty);
    assert!(h.workflow.persistence().is_scheduled());

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(h.repository.updates(), 1);
    assert!(!h.workflow.session().await.is_dirty);
}

#[tokio::test]
async fn test_restore_without_consent_discards_snapshot() {
    let h = harness(FakeEngine::replying(group_b_reply()));
    let mut snapshot = DimensioningSession::new();
    snapshot.name = "Old".to_string();
    h.local.save_snapshot(&snapshot).await.unwrap();

    assert!(!h.workflow.restore().await.unwrap());
    assert_eq!(h.workflow.session().await.name, "");
    assert!(h.local.load_snapshot().await.unwrap().is_none());
}

#[tokio::test]
async fn test_tariff_group_change_drops_results() {
    let h = harness(FakeEngine::replying(group_b_reply()));
    complete_group_b(&h.workflow).await;
    h.workflow.calculate().await.unwrap();

    h.workflow
        .update_domain(DomainPatch::Customer(CustomerPatch {
            tariff_group: Some(TariffGroup::A),
            ..Default::default()
        }))
        .await;
    assert!(h.workflow.session().await.results.is_none());
}
