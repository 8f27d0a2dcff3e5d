//! AWS Systems Manager

pub mod api;
pub mod patch_group;

pub use api::SsmApi;
pub use patch_group::PatchGroup;
