//! Typed client registry and provider context
//!
//! The registry holds one typed client per cloud service, keyed by region,
//! produced at startup from the host's credential chain. It is built once
//! and immutable afterwards; the clients it returns are long-lived and
//! shared by every lifecycle callback in the process (the underlying
//! transports are thread-safe by contract).
//!
//! `ProviderContext` is the explicit replacement for an opaque per-call
//! meta handle: every callback and upgrader receives it by reference.

use crate::error::ProviderError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for the process-wide client registry
#[derive(Default)]
pub struct ClientRegistryBuilder {
    clients: HashMap<(TypeId, String), Arc<dyn Any + Send + Sync>>,
}

impl ClientRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client for a service interface in one region
    ///
    /// `T` is usually a `dyn`-trait service interface:
    /// `builder.register::<dyn KinesisApi>("us-west-2", client)`.
    pub fn register<T>(mut self, region: &str, client: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.clients
            .insert((TypeId::of::<T>(), region.to_string()), Arc::new(client));
        self
    }

    pub fn build(self) -> ClientRegistry {
        ClientRegistry {
            clients: self.clients,
        }
    }
}

/// Immutable per-process registry of typed service clients
pub struct ClientRegistry {
    clients: HashMap<(TypeId, String), Arc<dyn Any + Send + Sync>>,
}

impl ClientRegistry {
    pub fn builder() -> ClientRegistryBuilder {
        ClientRegistryBuilder::new()
    }

    /// Look up the client for a service interface in a region
    pub fn get<T>(&self, region: &str) -> Result<Arc<T>, ProviderError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.clients
            .get(&(TypeId::of::<T>(), region.to_string()))
            .and_then(|any| any.downcast_ref::<Arc<T>>())
            .cloned()
            .ok_or_else(|| ProviderError::MissingClient {
                service: std::any::type_name::<T>().to_string(),
                region: region.to_string(),
            })
    }
}

/// Context passed into every lifecycle callback, upgrader and sweeper
pub struct ProviderContext {
    registry: ClientRegistry,
    default_region: String,
    partition: String,
}

impl ProviderContext {
    pub fn new(
        registry: ClientRegistry,
        default_region: impl Into<String>,
        partition: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            default_region: default_region.into(),
            partition: partition.into(),
        }
    }

    /// Client for the default region
    pub fn client<T>(&self) -> Result<Arc<T>, ProviderError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.registry.get::<T>(&self.default_region)
    }

    /// Client for an explicit region
    pub fn client_in<T>(&self, region: &str) -> Result<Arc<T>, ProviderError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.registry.get::<T>(region)
    }

    pub fn default_region(&self) -> &str {
        &self.default_region
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }
}
