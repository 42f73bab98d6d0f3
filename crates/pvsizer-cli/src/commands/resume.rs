use anyhow::Result;
use pvsizer_core::dimensioning::{DimensioningState, LocalSessionStore};

use super::utils::{load_config, local_store};

pub async fn run() -> Result<()> {
    let config = load_config()?;
    let store = local_store(&config)?;

    let Some(snapshot) = store.load_snapshot().await? else {
        println!("No local session at {}", store.path().display());
        return Ok(());
    };

    let continue_previous = store.continue_previous().await?;
    let state = DimensioningState::from_session(snapshot.clone());
    let navigation = state.navigation();
    println!(
        "Session '{}' ({}), step {}, unsaved changes: {}",
        snapshot.name,
        snapshot.id.as_deref().unwrap_or("not saved yet"),
        navigation.current,
        snapshot.is_dirty
    );
    println!(
        "Completed steps: {}",
        snapshot
            .completed_steps
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Continue previous session on start: {}", continue_previous);
    Ok(())
}
