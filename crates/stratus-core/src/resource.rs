//! Resource lifecycle driver
//!
//! A resource type implements [`ResourceLifecycle`]; the [`Driver`] wraps it
//! and enforces the contracts the host relies on: identifier presence after
//! Create, read-after-write population of computed attributes, the uniform
//! "not found means drop from state" policy, idempotent Delete, and the
//! force-new discipline that turns in-place updates of replacement-only
//! attributes into an error.
//!
//! The driver is safe for concurrent invocation across instances; within a
//! single instance the host calls operations strictly sequentially.

use crate::error::ProviderError;
use crate::registry::ProviderContext;
use crate::upgrade::StateUpgrade;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use stratus_schema::{AttrValue, ResourceData, Schema, SchemaError, Timeouts};
use thiserror::Error;

/// The per-resource dispatch surface
///
/// Callbacks receive the attribute bundle and the provider context, and
/// return `Ok(())` or a [`ProviderError`]. Read callbacks go through a
/// finder and surface [`ProviderError::NotFound`] when the remote does not
/// have the object; the driver decides what that means per operation.
#[async_trait]
pub trait ResourceLifecycle: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Arc<Schema>;

    fn schema_version(&self) -> u64 {
        0
    }

    fn upgraders(&self) -> Vec<Arc<dyn StateUpgrade>> {
        Vec::new()
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    /// Attributes that cannot be recovered from the remote (write-only
    /// blobs); import-equivalence tests skip them
    fn import_state_verify_ignore(&self) -> &'static [&'static str] {
        &[]
    }

    /// Issue the remote create; must `set_id` before any wait so a failed
    /// wait still leaves a recoverable identifier in state
    async fn create(&self, data: &mut ResourceData, ctx: &ProviderContext)
    -> Result<(), ProviderError>;

    /// Populate the bundle from the live object; idempotent and
    /// side-effect-free on the remote
    async fn read(&self, data: &mut ResourceData, ctx: &ProviderContext)
    -> Result<(), ProviderError>;

    /// Issue only the calls required for changed attributes; never submits
    /// force-new changes (the driver rejects those before dispatch)
    async fn update(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let _ = (data, ctx);
        Err(ProviderError::NoUpdate {
            resource: self.type_name().to_string(),
        })
    }

    /// Issue the remote delete; surface NotFound as-is, the driver maps it
    /// to success
    async fn delete(&self, data: &mut ResourceData, ctx: &ProviderContext)
    -> Result<(), ProviderError>;

    /// Prepare the bundle for import; the default passes the id through and
    /// lets Read fill everything. Composite-id resources override this to
    /// decode the string into attributes first.
    async fn import(
        &self,
        id: &str,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let _ = ctx;
        data.set_id(id);
        Ok(())
    }
}

/// Failure from [`Driver::create`] or [`Driver::update`]
///
/// Mutating operations can stop partway with remote truth the host must
/// still persist: an identifier set before a failed wait, or the values
/// Read refreshed after a partial update. The bundle rides along in the
/// error; `data` is `None` when nothing reached the remote (validation,
/// force-new rejection).
#[derive(Debug, Error)]
#[error("{error}")]
pub struct DriverError {
    #[source]
    pub error: ProviderError,
    pub data: Option<ResourceData>,
}

impl DriverError {
    fn with_state(error: ProviderError, data: ResourceData) -> Self {
        Self {
            error,
            data: Some(data),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.error.is_not_found()
    }
}

impl From<ProviderError> for DriverError {
    fn from(error: ProviderError) -> Self {
        Self { error, data: None }
    }
}

impl From<SchemaError> for DriverError {
    fn from(error: SchemaError) -> Self {
        ProviderError::from(error).into()
    }
}

/// Lifecycle dispatcher for one resource type
#[derive(Clone)]
pub struct Driver {
    resource: Arc<dyn ResourceLifecycle>,
}

impl Driver {
    pub fn new(resource: Arc<dyn ResourceLifecycle>) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &Arc<dyn ResourceLifecycle> {
        &self.resource
    }

    fn name(&self) -> &'static str {
        self.resource.type_name()
    }

    /// Create from validated configuration, then Read to populate computed
    /// attributes
    ///
    /// A failed create may have registered the remote object before the
    /// error; the bundle in [`DriverError`] carries the partial identifier
    /// so a subsequent Read can recover it instead of orphaning the object.
    pub async fn create(
        &self,
        config: BTreeMap<String, AttrValue>,
        ctx: &ProviderContext,
    ) -> Result<ResourceData, DriverError> {
        let mut data =
            ResourceData::for_create(self.resource.schema(), config, self.resource.timeouts())?;
        tracing::debug!(resource = self.name(), "creating");
        if let Err(err) = self.resource.create(&mut data, ctx).await {
            return Err(DriverError::with_state(err, data));
        }

        match data.id() {
            Some(id) if !id.is_empty() => {}
            _ => {
                let err = ProviderError::MissingId {
                    resource: self.name().to_string(),
                };
                return Err(DriverError::with_state(err, data));
            }
        }

        // is_new_resource is still set, so a NotFound here surfaces as a
        // creation-visibility error instead of silently clearing the id
        if let Err(err) = self.resource.read(&mut data, ctx).await {
            return Err(DriverError::with_state(err, data));
        }
        tracing::debug!(resource = self.name(), id = data.id(), "created");
        Ok(data)
    }

    /// Read by identifier; NotFound clears the identifier and succeeds
    pub async fn read(
        &self,
        id: &str,
        prior: BTreeMap<String, AttrValue>,
        ctx: &ProviderContext,
    ) -> Result<ResourceData, ProviderError> {
        let mut data =
            ResourceData::for_state(self.resource.schema(), id, prior, self.resource.timeouts());
        match self.resource.read(&mut data, ctx).await {
            Ok(()) => Ok(data),
            Err(err) if err.is_not_found() => {
                tracing::warn!(
                    resource = self.name(),
                    id,
                    "not found on remote, removing from state"
                );
                data.clear_id();
                Ok(data)
            }
            Err(err) => Err(err),
        }
    }

    /// Update changed attributes in place, then Read
    ///
    /// Read runs even when the update failed partway, and the refreshed
    /// bundle rides along in the error so persisted state can reflect the
    /// post-partial-update remote truth; the update error still wins.
    pub async fn update(
        &self,
        id: &str,
        prior: BTreeMap<String, AttrValue>,
        desired: BTreeMap<String, AttrValue>,
        ctx: &ProviderContext,
    ) -> Result<ResourceData, DriverError> {
        let mut data = ResourceData::for_update(
            self.resource.schema(),
            id,
            prior,
            desired,
            self.resource.timeouts(),
        )?;

        for key in data.schema().force_new_keys() {
            if data.has_change(key) {
                return Err(ProviderError::ForceNew {
                    resource: self.name().to_string(),
                    id: id.to_string(),
                    attribute: key.to_string(),
                }
                .into());
            }
        }

        tracing::debug!(resource = self.name(), id, "updating");
        let update_result = self.resource.update(&mut data, ctx).await;
        // NotFound mid-update means the remote is in an inconsistent state;
        // surface it rather than clearing
        let read_result = self.resource.read(&mut data, ctx).await;
        if let Err(err) = update_result.and(read_result) {
            return Err(DriverError::with_state(err, data));
        }
        Ok(data)
    }

    /// Delete by identifier; NotFound is success, failure leaves the
    /// identifier set so a retry deletes again
    pub async fn delete(
        &self,
        id: &str,
        prior: BTreeMap<String, AttrValue>,
        ctx: &ProviderContext,
    ) -> Result<ResourceData, ProviderError> {
        let mut data =
            ResourceData::for_state(self.resource.schema(), id, prior, self.resource.timeouts());
        tracing::debug!(resource = self.name(), id, "deleting");
        match self.resource.delete(&mut data, ctx).await {
            Ok(()) => {
                data.clear_id();
                Ok(data)
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!(resource = self.name(), id, "already gone");
                data.clear_id();
                Ok(data)
            }
            Err(err) => Err(err),
        }
    }

    /// Import a user-supplied identifier, then Read to build the bundle
    pub async fn import(
        &self,
        id: &str,
        ctx: &ProviderContext,
    ) -> Result<ResourceData, ProviderError> {
        let mut data = ResourceData::for_state(
            self.resource.schema(),
            id,
            BTreeMap::new(),
            self.resource.timeouts(),
        );
        self.resource.import(id, &mut data, ctx).await?;
        // importing something that does not exist is an error, not a
        // drop-from-state
        self.resource.read(&mut data, ctx).await?;
        Ok(data)
    }
}
