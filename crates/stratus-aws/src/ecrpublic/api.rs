//! ECR Public client interface

use async_trait::async_trait;
use stratus_core::ApiError;

#[derive(Debug, Clone)]
pub struct RepositoryPolicyDescription {
    pub repository_name: String,
    pub registry_id: String,
    pub policy_text: String,
}

#[derive(Debug, Clone)]
pub struct SetRepositoryPolicyInput {
    pub repository_name: String,
    pub policy_text: String,
}

#[derive(Debug, Clone)]
pub struct GetRepositoryPolicyInput {
    pub repository_name: String,
}

#[derive(Debug, Clone)]
pub struct DeleteRepositoryPolicyInput {
    pub repository_name: String,
}

/// Opaque ECR Public transport
#[async_trait]
pub trait EcrPublicApi: Send + Sync {
    async fn set_repository_policy(
        &self,
        input: SetRepositoryPolicyInput,
    ) -> Result<RepositoryPolicyDescription, ApiError>;

    async fn get_repository_policy(
        &self,
        input: GetRepositoryPolicyInput,
    ) -> Result<RepositoryPolicyDescription, ApiError>;

    async fn delete_repository_policy(
        &self,
        input: DeleteRepositoryPolicyInput,
    ) -> Result<(), ApiError>;
}
