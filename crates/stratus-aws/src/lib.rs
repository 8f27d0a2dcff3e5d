//! AWS resource adapters for Stratus
//!
//! Each service module pairs an opaque async client trait (the SDK
//! boundary — input and output structs with `Option`-wrapped optional
//! fields, never raw HTTP) with the resource types built on it. Adapters
//! stay thin: finders normalize not-found, the core's retry harness and
//! wait poller handle eventual consistency, and the lifecycle driver
//! enforces the CRUD contracts.

pub mod directconnect;
pub mod ecrpublic;
pub mod globalaccelerator;
pub mod kinesis;
pub mod pinpoint;
pub mod ssm;
pub mod sweep;

pub use sweep::register_sweepers;
