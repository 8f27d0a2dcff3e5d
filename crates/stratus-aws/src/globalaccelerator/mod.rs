//! AWS Global Accelerator

pub mod api;
pub mod listener;

pub use api::GlobalAcceleratorApi;
pub use listener::Listener;
