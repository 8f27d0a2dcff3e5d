//! ECR Public repository policy
//!
//! The policy is a sub-resource of the repository, addressed by the
//! repository name. Freshly set policies can lag behind the read path, so
//! a read on a new resource retries the not-found answer for a short
//! window before trusting it.

use crate::ecrpublic::api::{
    DeleteRepositoryPolicyInput, EcrPublicApi, GetRepositoryPolicyInput,
    RepositoryPolicyDescription, SetRepositoryPolicyInput,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use stratus_core::{
    FindResult, FinderError, ProviderContext, ProviderError, ResourceLifecycle, RetryError,
    is_not_found, not_found_ok, retry_then_call,
};
use stratus_schema::{AttrType, Attribute, Operation, ResourceData, Schema};

const NOT_FOUND_CODES: &[&str] = &[
    "RepositoryPolicyNotFoundException",
    "RepositoryNotFoundException",
];

const PROPAGATION_TIMEOUT: Duration = Duration::from_secs(60);

pub async fn find_repository_policy(
    client: &Arc<dyn EcrPublicApi>,
    repository_name: &str,
) -> FindResult<RepositoryPolicyDescription> {
    client
        .get_repository_policy(GetRepositoryPolicyInput {
            repository_name: repository_name.to_string(),
        })
        .await
        .map_err(|e| {
            if is_not_found(&e, NOT_FOUND_CODES) {
                FinderError::NotFound
            } else {
                FinderError::Api(e)
            }
        })
}

pub struct RepositoryPolicy;

#[async_trait]
impl ResourceLifecycle for RepositoryPolicy {
    fn type_name(&self) -> &'static str {
        "aws_ecrpublic_repository_policy"
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::new(
            Schema::new()
                .attr(
                    "repository_name",
                    Attribute::required(AttrType::String).force_new(),
                )
                .attr("policy", Attribute::required(AttrType::String))
                .attr("registry_id", Attribute::computed(AttrType::String)),
        )
    }

    async fn create(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn EcrPublicApi>()?;
        let repository_name = data
            .get_string("repository_name")
            .unwrap_or_default()
            .to_string();
        let policy = data.get_string("policy").unwrap_or_default().to_string();

        let description = client
            .set_repository_policy(SetRepositoryPolicyInput {
                repository_name: repository_name.clone(),
                policy_text: policy,
            })
            .await
            .map_err(|e| {
                ProviderError::api(self.type_name(), &repository_name, Operation::Create, e)
            })?;

        data.set("registry_id", description.registry_id)?;
        data.set_id(repository_name);
        Ok(())
    }

    async fn read(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn EcrPublicApi>()?;
        let repository_name = data.id().unwrap_or_default().to_string();

        let found = if data.is_new_resource() {
            // the policy was just written; give the read path a window to
            // catch up before believing NotFound
            let attempt_client = client.clone();
            let attempt_name = repository_name.clone();
            let result = retry_then_call(
                PROPAGATION_TIMEOUT,
                move || {
                    let client = attempt_client.clone();
                    let repository_name = attempt_name.clone();
                    async move {
                        match find_repository_policy(&client, &repository_name).await {
                            Ok(description) => Ok(Some(description)),
                            Err(FinderError::NotFound) => Err(RetryError::Retryable(
                                stratus_core::ApiError::new(
                                    "RepositoryPolicyNotFoundException",
                                    "policy not yet visible",
                                ),
                            )),
                            Err(FinderError::Api(e)) => Err(RetryError::NonRetryable(e)),
                        }
                    }
                },
                || {
                    let client = client.clone();
                    let repository_name = repository_name.clone();
                    async move {
                        not_found_ok(find_repository_policy(&client, &repository_name).await)
                    }
                },
            )
            .await;
            result.map_err(|e| {
                ProviderError::api(
                    self.type_name(),
                    &repository_name,
                    Operation::Read,
                    e.into_inner(),
                )
            })?
        } else {
            not_found_ok(find_repository_policy(&client, &repository_name).await).map_err(
                |e| ProviderError::api(self.type_name(), &repository_name, Operation::Read, e),
            )?
        };

        match found {
            Some(description) => {
                data.set("repository_name", description.repository_name)?;
                data.set("registry_id", description.registry_id)?;
                data.set("policy", description.policy_text)?;
                Ok(())
            }
            None => Err(ProviderError::not_found(self.type_name(), repository_name)),
        }
    }

    async fn update(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn EcrPublicApi>()?;
        let repository_name = data.id().unwrap_or_default().to_string();
        let policy = data.get_string("policy").unwrap_or_default().to_string();

        client
            .set_repository_policy(SetRepositoryPolicyInput {
                repository_name: repository_name.clone(),
                policy_text: policy,
            })
            .await
            .map_err(|e| {
                ProviderError::api(self.type_name(), &repository_name, Operation::Update, e)
            })?;
        Ok(())
    }

    async fn delete(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn EcrPublicApi>()?;
        let repository_name = data.id().unwrap_or_default().to_string();

        match client
            .delete_repository_policy(DeleteRepositoryPolicyInput {
                repository_name: repository_name.clone(),
            })
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e, NOT_FOUND_CODES) => {
                Err(ProviderError::not_found(self.type_name(), repository_name))
            }
            Err(e) => Err(ProviderError::api(
                self.type_name(),
                repository_name,
                Operation::Delete,
                e,
            )),
        }
    }
}
