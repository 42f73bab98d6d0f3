use anyhow::Result;
use pvsizer_application::DimensioningWorkflow;
use pvsizer_core::config::SizerConfig;
use pvsizer_infrastructure::{HttpProjectRepository, MemoryLocalSessionStore};
use pvsizer_interaction::HttpCalculationEngine;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::utils::{load_config, print_json, read_session};

/// Workflow for a one-off run on a session file.
///
/// Snapshots stay in memory so the user's resume file is left alone.
fn file_workflow(config: &SizerConfig) -> DimensioningWorkflow {
    DimensioningWorkflow::new(
        Arc::new(HttpProjectRepository::from_config(&config.backend)),
        Arc::new(MemoryLocalSessionStore::new()),
        Arc::new(HttpCalculationEngine::from_config(&config.engine)),
        config.autosave.quiet_period(),
    )
}

pub async fn run(path: &Path, save: bool) -> Result<()> {
    let config = load_config()?;
    let workflow = file_workflow(&config);

    workflow.load_session(read_session(path)?).await;
    let results = workflow.calculate().await?;
    print_json(&results)?;

    if save {
        let outcome = workflow.save_now().await?;
        info!(?outcome, "Session saved");
    }
    // Nothing scheduled may outlive the command.
    workflow.persistence().cancel();
    Ok(())
}
