//! SSM client interface

use async_trait::async_trait;
use stratus_core::ApiError;

#[derive(Debug, Clone)]
pub struct PatchGroupMapping {
    pub patch_group: String,
    pub baseline_id: String,
    pub operating_system: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DescribePatchGroupsInput {
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DescribePatchGroupsOutput {
    pub mappings: Vec<PatchGroupMapping>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegisterPatchBaselineForPatchGroupInput {
    pub baseline_id: String,
    pub patch_group: String,
}

#[derive(Debug, Clone)]
pub struct DeregisterPatchBaselineForPatchGroupInput {
    pub baseline_id: String,
    pub patch_group: String,
}

/// Opaque SSM transport
#[async_trait]
pub trait SsmApi: Send + Sync {
    async fn register_patch_baseline_for_patch_group(
        &self,
        input: RegisterPatchBaselineForPatchGroupInput,
    ) -> Result<(), ApiError>;

    async fn describe_patch_groups(
        &self,
        input: DescribePatchGroupsInput,
    ) -> Result<DescribePatchGroupsOutput, ApiError>;

    async fn deregister_patch_baseline_for_patch_group(
        &self,
        input: DeregisterPatchBaselineForPatchGroupInput,
    ) -> Result<(), ApiError>;
}
