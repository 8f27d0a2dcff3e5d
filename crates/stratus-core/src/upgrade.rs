//! Schema-version state upgraders
//!
//! A resource's persisted state carries the schema version it was written
//! under. When the current schema is newer, the host hands the raw attribute
//! bag to the upgrade chain before anything else touches it. Each upgrader
//! maps version N to N+1; they run in sequence and must be pure aside from
//! read-only remote queries (e.g. discovering an identifier that did not
//! exist in the old shape). Upgraders never mutate the remote.

use crate::error::ProviderError;
use crate::registry::ProviderContext;
use async_trait::async_trait;
use std::sync::Arc;

/// Raw persisted attribute bag, as the host stores it
pub type RawState = serde_json::Map<String, serde_json::Value>;

/// One step of the upgrade chain
#[async_trait]
pub trait StateUpgrade: Send + Sync {
    /// The schema version this upgrader consumes; it produces version + 1
    fn from_version(&self) -> u64;

    async fn upgrade(
        &self,
        raw: RawState,
        ctx: &ProviderContext,
    ) -> Result<RawState, ProviderError>;
}

/// Run the upgrade chain from the persisted version to the current one
pub async fn upgrade_state(
    resource: &str,
    mut raw: RawState,
    stored_version: u64,
    current_version: u64,
    upgraders: &[Arc<dyn StateUpgrade>],
    ctx: &ProviderContext,
) -> Result<RawState, ProviderError> {
    if stored_version > current_version {
        return Err(ProviderError::Upgrade {
            resource: resource.to_string(),
            from: stored_version,
            message: format!(
                "persisted version is newer than the supported version {current_version}"
            ),
        });
    }

    let mut chain: Vec<&Arc<dyn StateUpgrade>> = upgraders
        .iter()
        .filter(|u| u.from_version() >= stored_version)
        .collect();
    chain.sort_by_key(|u| u.from_version());

    let mut version = stored_version;
    for upgrader in chain {
        if upgrader.from_version() != version {
            return Err(ProviderError::Upgrade {
                resource: resource.to_string(),
                from: stored_version,
                message: format!("no upgrader registered for version {version}"),
            });
        }
        tracing::debug!(resource, from = version, "upgrading persisted state");
        raw = upgrader.upgrade(raw, ctx).await?;
        version += 1;
    }

    if version != current_version {
        return Err(ProviderError::Upgrade {
            resource: resource.to_string(),
            from: stored_version,
            message: format!("upgrade chain ends at version {version}, expected {current_version}"),
        });
    }
    Ok(raw)
}
