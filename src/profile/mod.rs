//! Player profiles
//!
//! Display-name lookup for account holders. The economy only needs names for
//! display, so a failed lookup degrades to a placeholder instead of an error.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Name shown when a profile lookup fails
pub const UNKNOWN_DISPLAY_NAME: &str = "ERROR";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("No profile for {0}")]
    NotFound(Uuid),

    #[error("Profile lookup was interrupted")]
    Interrupted,

    #[error("Profile lookup failed: {0}")]
    Lookup(String),
}

/// Resolves a player's display name from their unique identifier
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn lookup_name(&self, id: Uuid) -> Result<String, ProfileError>;
}

/// Look up a display name, logging and substituting the placeholder on failure
pub async fn resolve_display_name(profiles: &dyn ProfileLookup, id: Uuid) -> String {
    match profiles.lookup_name(id).await {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(
                account_id = %id,
                error = %e,
                "Profile lookup failed, using placeholder display name"
            );
            UNKNOWN_DISPLAY_NAME.to_string()
        }
    }
}

/// Profile registry kept in memory
#[derive(Debug, Default)]
pub struct InMemoryProfiles {
    names: RwLock<HashMap<Uuid, String>>,
}

impl InMemoryProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or rename a player
    pub async fn register(&self, id: Uuid, name: impl Into<String>) {
        self.names.write().await.insert(id, name.into());
    }
}

#[async_trait]
impl ProfileLookup for InMemoryProfiles {
    async fn lookup_name(&self, id: Uuid) -> Result<String, ProfileError> {
        self.names
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ProfileError::NotFound(id))
    }
}
