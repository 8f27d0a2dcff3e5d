//! Stratus reconciliation engine
//!
//! This crate drives the CRUD lifecycle every Stratus resource type follows:
//! the dispatch driver that enforces the Create/Read/Update/Delete/Import
//! contracts, the eventual-consistency retry harness, the state-change wait
//! poller, the finder contract that normalizes not-found, the composite
//! identifier codec, schema-version upgraders, the typed client registry,
//! and the sweeper framework that garbage-collects test resources.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  Host runtime                    │
//! │        (config parsing, diffing, state)          │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                stratus-core                      │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │   Driver + trait ResourceLifecycle        │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌───────┐ ┌───────┐ ┌────────┐ ┌─────────┐    │
//! │  │ retry │ │waiter │ │finders │ │sweepers │    │
//! │  └───────┘ └───────┘ └────────┘ └─────────┘    │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │  service SDK  │  (opaque clients in the registry)
//! └───────────────┘
//! ```

pub mod error;
pub mod finder;
pub mod id;
pub mod registry;
pub mod resource;
pub mod retry;
pub mod sweep;
pub mod upgrade;
pub mod waiter;

// Re-exports
pub use error::{
    ApiError, ProviderError, Result, is_code, is_message_contains, is_not_found,
    is_skippable_sweep_error, is_throttled,
};
pub use finder::{FindResult, FinderError, not_found_ok};
pub use id::{decode_composite_id, encode_composite_id};
pub use registry::{ClientRegistry, ClientRegistryBuilder, ProviderContext};
pub use resource::{Driver, DriverError, ResourceLifecycle};
pub use retry::{RetryError, RetryFailure, retry, retry_then_call};
pub use sweep::{
    DEFAULT_TEST_PREFIXES, SweepError, SweepErrors, SweepReport, Sweeper, SweeperRegistry,
    is_sweepable,
};
pub use upgrade::{RawState, StateUpgrade, upgrade_state};
pub use waiter::{StateChange, WaitError, wait_for_deletion, wait_for_state};
