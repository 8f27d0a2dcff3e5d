//! SSM patch group registration
//!
//! Binds a patch baseline to a patch group. The remote has no single-key
//! lookup for the pair, so the identifier is the composite
//! `patch_group,baseline_id` and the finder pages `DescribePatchGroups`.

use crate::ssm::api::{
    DeregisterPatchBaselineForPatchGroupInput, DescribePatchGroupsInput, PatchGroupMapping,
    RegisterPatchBaselineForPatchGroupInput, SsmApi,
};
use async_trait::async_trait;
use std::sync::Arc;
use stratus_core::{
    FindResult, FinderError, ProviderContext, ProviderError, ResourceLifecycle, decode_composite_id,
    encode_composite_id, is_not_found,
};
use stratus_schema::{AttrType, Attribute, Operation, ResourceData, Schema};

const ID_DELIMITER: char = ',';
const ID_PARTS: &[&str] = &["patch-group", "baseline-id"];
const NOT_FOUND_CODES: &[&str] = &["DoesNotExistException"];

/// Resolve a baseline registration by paging the patch-group listing
pub async fn find_patch_group(
    client: &Arc<dyn SsmApi>,
    patch_group: &str,
    baseline_id: &str,
) -> FindResult<PatchGroupMapping> {
    let mut next_token = None;
    loop {
        let output = client
            .describe_patch_groups(DescribePatchGroupsInput {
                max_results: Some(50),
                next_token,
            })
            .await
            .map_err(FinderError::Api)?;

        if let Some(mapping) = output
            .mappings
            .into_iter()
            .find(|m| m.patch_group == patch_group && m.baseline_id == baseline_id)
        {
            return Ok(mapping);
        }

        match output.next_token {
            Some(token) => next_token = Some(token),
            None => return Err(FinderError::NotFound),
        }
    }
}

pub struct PatchGroup;

impl PatchGroup {
    fn decode(id: &str) -> Result<(String, String), ProviderError> {
        let parts = decode_composite_id(id, ID_DELIMITER, ID_PARTS)?;
        Ok((parts[0].clone(), parts[1].clone()))
    }
}

#[async_trait]
impl ResourceLifecycle for PatchGroup {
    fn type_name(&self) -> &'static str {
        "aws_ssm_patch_group"
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::new(
            Schema::new()
                .attr(
                    "patch_group",
                    Attribute::required(AttrType::String).force_new(),
                )
                .attr(
                    "baseline_id",
                    Attribute::required(AttrType::String).force_new(),
                ),
        )
    }

    async fn create(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn SsmApi>()?;
        let patch_group = data.get_string("patch_group").unwrap_or_default().to_string();
        let baseline_id = data.get_string("baseline_id").unwrap_or_default().to_string();

        client
            .register_patch_baseline_for_patch_group(RegisterPatchBaselineForPatchGroupInput {
                baseline_id: baseline_id.clone(),
                patch_group: patch_group.clone(),
            })
            .await
            .map_err(|e| {
                ProviderError::api(
                    self.type_name(),
                    &patch_group,
                    Operation::Create,
                    e,
                )
            })?;

        data.set_id(encode_composite_id(&[&patch_group, &baseline_id], ID_DELIMITER));
        Ok(())
    }

    async fn read(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn SsmApi>()?;
        let id = data.id().unwrap_or_default().to_string();
        let (patch_group, baseline_id) = Self::decode(&id)?;

        match find_patch_group(&client, &patch_group, &baseline_id).await {
            Ok(mapping) => {
                data.set("patch_group", mapping.patch_group)?;
                data.set("baseline_id", mapping.baseline_id)?;
                Ok(())
            }
            Err(FinderError::NotFound) => Err(ProviderError::not_found(self.type_name(), id)),
            Err(FinderError::Api(e)) => {
                Err(ProviderError::api(self.type_name(), id, Operation::Read, e))
            }
        }
    }

    async fn delete(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn SsmApi>()?;
        let id = data.id().unwrap_or_default().to_string();
        let (patch_group, baseline_id) = Self::decode(&id)?;

        match client
            .deregister_patch_baseline_for_patch_group(
                DeregisterPatchBaselineForPatchGroupInput {
                    baseline_id,
                    patch_group,
                },
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e, NOT_FOUND_CODES) => {
                Err(ProviderError::not_found(self.type_name(), id))
            }
            Err(e) => Err(ProviderError::api(self.type_name(), id, Operation::Delete, e)),
        }
    }
}
