//! Kinesis stream consumer (enhanced fan-out)
//!
//! Registration is asynchronous: the consumer passes through CREATING
//! before it is usable, and deregistration through DELETING before the
//! finder stops seeing it.

use crate::kinesis::api::{
    ConsumerDescription, DeregisterStreamConsumerInput, DescribeStreamConsumerInput, KinesisApi,
    RegisterStreamConsumerInput,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use stratus_core::{
    FindResult, FinderError, ProviderContext, ProviderError, ResourceLifecycle, StateChange,
    is_not_found, not_found_ok, wait_for_deletion, wait_for_state,
};
use stratus_schema::{AttrType, Attribute, Operation, ResourceData, Schema, Timeouts};

const NOT_FOUND_CODES: &[&str] = &["ResourceNotFoundException"];

const STATUS_CREATING: &str = "CREATING";
const STATUS_ACTIVE: &str = "ACTIVE";
const STATUS_DELETING: &str = "DELETING";

/// Resolve a consumer by its ARN
pub async fn find_stream_consumer(
    client: &Arc<dyn KinesisApi>,
    consumer_arn: &str,
) -> FindResult<ConsumerDescription> {
    client
        .describe_stream_consumer(DescribeStreamConsumerInput {
            consumer_arn: Some(consumer_arn.to_string()),
            ..Default::default()
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

pub struct StreamConsumer;

impl StreamConsumer {
    async fn wait_until_active(
        client: &Arc<dyn KinesisApi>,
        consumer_arn: &str,
        timeout: Duration,
    ) -> Result<ConsumerDescription, ProviderError> {
        let conf = StateChange::new(&[STATUS_CREATING], &[STATUS_ACTIVE], timeout)
            .with_poll_interval(Duration::from_secs(10));
        let client = client.clone();
        let arn = consumer_arn.to_string();
        let found = wait_for_state(&conf, move || {
            let client = client.clone();
            let arn = arn.clone();
            async move {
                let consumer = not_found_ok(find_stream_consumer(&client, &arn).await)?;
                Ok(consumer.map(|c| {
                    let status = c.status.clone();
                    (c, status)
                }))
            }
        })
        .await
        .map_err(|e| e.for_resource("aws_kinesis_stream_consumer", consumer_arn, Operation::Create))?;

        found.ok_or_else(|| ProviderError::not_found("aws_kinesis_stream_consumer", consumer_arn))
    }
}

#[async_trait]
impl ResourceLifecycle for StreamConsumer {
    fn type_name(&self) -> &'static str {
        "aws_kinesis_stream_consumer"
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::new(
            Schema::new()
                .attr("name", Attribute::required(AttrType::String).force_new())
                .attr(
                    "stream_arn",
                    Attribute::required(AttrType::String).force_new(),
                )
                .attr("arn", Attribute::computed(AttrType::String))
                .attr("status", Attribute::computed(AttrType::String))
                .attr(
                    "creation_timestamp",
                    Attribute::computed(AttrType::String),
                ),
        )
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
            .with_create(Duration::from_secs(5 * 60))
            .with_delete(Duration::from_secs(5 * 60))
    }

    async fn create(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn KinesisApi>()?;
        let name = data.get_string("name").unwrap_or_default().to_string();
        let stream_arn = data.get_string("stream_arn").unwrap_or_default().to_string();

        let output = client
            .register_stream_consumer(RegisterStreamConsumerInput {
                stream_arn,
                consumer_name: name.clone(),
            })
            .await
            .map_err(|e| ProviderError::api(self.type_name(), &name, Operation::Create, e))?;

        // set the id before waiting so a timed-out wait still leaves a
        // recoverable identifier in state
        data.set_id(output.consumer.consumer_arn.clone());
        Self::wait_until_active(
            &client,
            &output.consumer.consumer_arn,
            data.timeout(Operation::Create),
        )
        .await?;
        Ok(())
    }

    async fn read(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn KinesisApi>()?;
        let arn = data.id().unwrap_or_default().to_string();

        match find_stream_consumer(&client, &arn).await {
            Ok(consumer) => {
                data.set("arn", consumer.consumer_arn)?;
                data.set("name", consumer.consumer_name)?;
                data.set("stream_arn", consumer.stream_arn)?;
                data.set("status", consumer.status)?;
                data.set("creation_timestamp", consumer.creation_timestamp.to_rfc3339())?;
                Ok(())
            }
            Err(FinderError::NotFound) => Err(ProviderError::not_found(self.type_name(), arn)),
            Err(FinderError::Api(e)) => {
                Err(ProviderError::api(self.type_name(), arn, Operation::Read, e))
            }
        }
    }

    async fn delete(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn KinesisApi>()?;
        let arn = data.id().unwrap_or_default().to_string();

        match client
            .deregister_stream_consumer(DeregisterStreamConsumerInput {
                consumer_arn: arn.clone(),
            })
            .await
        {
            Ok(()) => {}
            Err(e) if is_not_found(&e, NOT_FOUND_CODES) => {
                return Err(ProviderError::not_found(self.type_name(), arn));
            }
            Err(e) => {
                return Err(ProviderError::api(self.type_name(), arn, Operation::Delete, e));
            }
        }

        let wait_client = client.clone();
        let wait_arn = arn.clone();
        wait_for_deletion(
            &[STATUS_DELETING, STATUS_ACTIVE],
            data.timeout(Operation::Delete),
            Duration::from_secs(10),
            move || {
                let client = wait_client.clone();
                let arn = wait_arn.clone();
                async move {
                    let consumer = not_found_ok(find_stream_consumer(&client, &arn).await)?;
                    Ok(consumer.map(|c| {
                        let status = c.status.clone();
                        (c, status)
                    }))
                }
            },
        )
        .await
        .map_err(|e| e.for_resource(self.type_name(), &arn, Operation::Delete))
    }
}
