//! Test-resource sweepers
//!
//! Region-scoped cleanup for resources acceptance tests leave behind. A
//! listing failure aborts the sweeper (and skips the region when the
//! service is unsupported there); per-object delete failures accumulate
//! and report together.

use crate::kinesis::api::{
    DeregisterStreamConsumerInput, KinesisApi, ListStreamConsumersInput, ListStreamsInput,
};
use crate::ssm::api::{
    DeregisterPatchBaselineForPatchGroupInput, DescribePatchGroupsInput, SsmApi,
};
use std::sync::Arc;
use stratus_core::{
    DEFAULT_TEST_PREFIXES, ProviderContext, SweepError, SweepErrors, Sweeper, SweeperRegistry,
    is_sweepable,
};

/// Register every sweeper this provider ships
pub fn register_sweepers(registry: &mut SweeperRegistry) -> Result<(), SweepError> {
    registry.register(Sweeper::new("ssm_patch_group", &[], sweep_patch_groups))?;
    registry.register(Sweeper::new(
        "kinesis_stream_consumer",
        &[],
        sweep_stream_consumers,
    ))?;
    Ok(())
}

async fn sweep_patch_groups(region: String, ctx: Arc<ProviderContext>) -> Result<(), SweepError> {
    let client = ctx.client_in::<dyn SsmApi>(&region)?;
    let mut errors = SweepErrors::new();
    let mut input = DescribePatchGroupsInput::default();

    loop {
        let output = client.describe_patch_groups(input.clone()).await?;
        for mapping in output.mappings {
            if !is_sweepable(&mapping.patch_group, DEFAULT_TEST_PREFIXES) {
                continue;
            }
            tracing::debug!(patch_group = %mapping.patch_group, "deregistering patch group");
            if let Err(err) = client
                .deregister_patch_baseline_for_patch_group(
                    DeregisterPatchBaselineForPatchGroupInput {
                        baseline_id: mapping.baseline_id.clone(),
                        patch_group: mapping.patch_group.clone(),
                    },
                )
                .await
            {
                errors.push(&mapping.patch_group, &err);
            }
        }
        match output.next_token {
            Some(token) => input.next_token = Some(token),
            None => break,
        }
    }
    errors.into_result()
}

async fn sweep_stream_consumers(
    region: String,
    ctx: Arc<ProviderContext>,
) -> Result<(), SweepError> {
    let client = ctx.client_in::<dyn KinesisApi>(&region)?;
    let mut errors = SweepErrors::new();
    let mut streams_input = ListStreamsInput::default();

    loop {
        let streams = client.list_streams(streams_input.clone()).await?;
        for stream_arn in streams.stream_arns {
            let mut consumers_input = ListStreamConsumersInput {
                stream_arn: stream_arn.clone(),
                next_token: None,
            };
            loop {
                let consumers = client.list_stream_consumers(consumers_input.clone()).await?;
                for consumer in consumers.consumers {
                    if !is_sweepable(&consumer.consumer_name, DEFAULT_TEST_PREFIXES) {
                        continue;
                    }
                    tracing::debug!(consumer = %consumer.consumer_name, "deregistering consumer");
                    if let Err(err) = client
                        .deregister_stream_consumer(DeregisterStreamConsumerInput {
                            consumer_arn: consumer.consumer_arn.clone(),
                        })
                        .await
                    {
                        errors.push(&consumer.consumer_name, &err);
                    }
                }
                match consumers.next_token {
                    Some(token) => consumers_input.next_token = Some(token),
                    None => break,
                }
            }
        }
        match streams.next_token {
            Some(token) => streams_input.next_token = Some(token),
            None => break,
        }
    }
    errors.into_result()
}
