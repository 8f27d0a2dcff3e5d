//! Stratus resource schema
//!
//! This crate provides the declarative contract every Stratus resource type
//! is built from: a typed attribute schema, the per-call attribute bundle
//! (`ResourceData`), per-operation timeout budgets, and the flat persisted
//! state layout the host serializes.
//!
//! The schema is a closed sum of attribute types (string, int, bool, float,
//! list, set, map, nested block); `ResourceData::set` and config validation
//! enforce it, so lifecycle callbacks never see an untyped bag.

pub mod attribute;
pub mod data;
pub mod error;
pub mod flatmap;
pub mod schema;
pub mod timeouts;
pub mod value;

// Re-exports
pub use attribute::{Attribute, ValidatorFn};
pub use data::ResourceData;
pub use error::{Result, SchemaError};
pub use flatmap::{expand, flatten};
pub use schema::Schema;
pub use timeouts::{Operation, Timeouts};
pub use value::{AttrType, AttrValue};
