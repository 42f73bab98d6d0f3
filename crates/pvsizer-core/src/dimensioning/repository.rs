//! Persistence ports for dimensioning sessions.
//!
//! Defines the interfaces for the remote project store and the local resume
//! store, decoupling the workflow from the storage mechanism.

use super::model::DimensioningSession;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Type discriminator stored on every project created by this workflow.
pub const PROJECT_TYPE_DIMENSIONING: &str = "dimensioning";

/// The opaque project record stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub name: String,
    pub project_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Full session snapshot.
    pub payload: DimensioningSession,
}

impl ProjectRecord {
    pub fn from_session(session: &DimensioningSession) -> Self {
        let name = if session.name.trim().is_empty() {
            session.customer.project_name.clone()
        } else {
            session.name.clone()
        };
        Self {
            name,
            project_type: PROJECT_TYPE_DIMENSIONING.to_string(),
            client_id: session.customer.client.as_ref().map(|c| c.id.clone()),
            address: session.customer.address.clone(),
            payload: session.clone(),
        }
    }
}

/// What the backend returns after a create or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    /// Some backends omit the id when answering an update.
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
}

/// Remote store for dimensioning projects.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Creates a new project and returns its assigned id.
    async fn create(&self, record: &ProjectRecord) -> Result<SaveReceipt>;

    /// Replaces the project with the given id.
    async fn update(&self, id: &str, record: &ProjectRecord) -> Result<SaveReceipt>;

    /// Loads the session snapshot of a project.
    ///
    /// - `Ok(Some(session))`: project found
    /// - `Ok(None)`: no project with this id
    async fn find_by_id(&self, id: &str) -> Result<Option<DimensioningSession>>;
}

/// Device-local store used to resume a session after a restart.
#[async_trait]
pub trait LocalSessionStore: Send + Sync {
    /// Writes the full session snapshot.
    async fn save_snapshot(&self, session: &DimensioningSession) -> Result<()>;

    /// Reads the last snapshot, if any.
    async fn load_snapshot(&self) -> Result<Option<DimensioningSession>>;

    /// Removes the snapshot and the resume flag.
    async fn clear(&self) -> Result<()>;

    /// Whether the user chose to continue the previous session.
    async fn continue_previous(&self) -> Result<bool>;

    async fn set_continue_previous(&self, value: bool) -> Result<()>;
}
