//! Pinpoint event stream
//!
//! Putting the event stream references an IAM role Pinpoint must be able
//! to assume. Right after the role is created the assume check fails with
//! a "make sure the IAM Role is configured correctly" message until IAM
//! propagates, so the put runs inside the retry harness for the
//! propagation window.

use crate::pinpoint::api::{
    DeleteEventStreamInput, EventStreamDescription, GetEventStreamInput, PinpointApi,
    PutEventStreamInput,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use stratus_core::{
    FindResult, FinderError, ProviderContext, ProviderError, ResourceLifecycle, RetryError,
    RetryFailure, is_not_found, retry,
};
use stratus_schema::{AttrType, Attribute, Operation, ResourceData, Schema};

const NOT_FOUND_CODES: &[&str] = &["NotFoundException"];
const IAM_PROPAGATION_TIMEOUT: Duration = Duration::from_secs(2 * 60);
const IAM_PROPAGATION_FRAGMENT: &str = "make sure the IAM Role is configured correctly";

/// Resolve the event stream of one Pinpoint application
pub async fn find_event_stream(
    client: &Arc<dyn PinpointApi>,
    application_id: &str,
) -> FindResult<EventStreamDescription> {
    client
        .get_event_stream(GetEventStreamInput {
            application_id: application_id.to_string(),
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

pub struct EventStream;

impl EventStream {
    async fn put(
        &self,
        data: &ResourceData,
        ctx: &ProviderContext,
        operation: Operation,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn PinpointApi>()?;
        let application_id = data
            .get_string("application_id")
            .unwrap_or_default()
            .to_string();
        let input = PutEventStreamInput {
            application_id: application_id.clone(),
            destination_stream_arn: data
                .get_string("destination_stream_arn")
                .unwrap_or_default()
                .to_string(),
            role_arn: data.get_string("role_arn").unwrap_or_default().to_string(),
        };

        let put_client = client.clone();
        retry(IAM_PROPAGATION_TIMEOUT, move || {
            let client = put_client.clone();
            let input = input.clone();
            async move {
                client.put_event_stream(input).await.map_err(|e| {
                    if e.message.contains(IAM_PROPAGATION_FRAGMENT) {
                        RetryError::Retryable(e)
                    } else {
                        RetryError::NonRetryable(e)
                    }
                })
            }
        })
        .await
        .map(|_| ())
        .map_err(|failure| match failure {
            RetryFailure::TimedOut { last } => ProviderError::TimedOut {
                resource: self.type_name().to_string(),
                id: application_id.clone(),
                operation,
                cause: last.to_string(),
            },
            RetryFailure::NonRetryable(e) => {
                ProviderError::api(self.type_name(), &application_id, operation, e)
            }
        })
    }
}

#[async_trait]
impl ResourceLifecycle for EventStream {
    fn type_name(&self) -> &'static str {
        "aws_pinpoint_event_stream"
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::new(
            Schema::new()
                .attr(
                    "application_id",
                    Attribute::required(AttrType::String).force_new(),
                )
                .attr(
                    "destination_stream_arn",
                    Attribute::required(AttrType::String),
                )
                .attr("role_arn", Attribute::required(AttrType::String)),
        )
    }

    async fn create(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        self.put(data, ctx, Operation::Create).await?;
        let application_id = data
            .get_string("application_id")
            .unwrap_or_default()
            .to_string();
        data.set_id(application_id);
        Ok(())
    }

    async fn read(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn PinpointApi>()?;
        let application_id = data.id().unwrap_or_default().to_string();

        match find_event_stream(&client, &application_id).await {
            Ok(stream) => {
                data.set("application_id", stream.application_id)?;
                data.set("destination_stream_arn", stream.destination_stream_arn)?;
                data.set("role_arn", stream.role_arn)?;
                Ok(())
            }
            Err(FinderError::NotFound) => {
                Err(ProviderError::not_found(self.type_name(), application_id))
            }
            Err(FinderError::Api(e)) => Err(ProviderError::api(
                self.type_name(),
                application_id,
                Operation::Read,
                e,
            )),
        }
    }

    /// The event stream is a put-style singleton per application; update
    /// re-puts the whole definition
    async fn update(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        self.put(data, ctx, Operation::Update).await
    }

    async fn delete(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn PinpointApi>()?;
        let application_id = data.id().unwrap_or_default().to_string();

        match client
            .delete_event_stream(DeleteEventStreamInput {
                application_id: application_id.clone(),
            })
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e, NOT_FOUND_CODES) => {
                Err(ProviderError::not_found(self.type_name(), application_id))
            }
            Err(e) => Err(ProviderError::api(
                self.type_name(),
                application_id,
                Operation::Delete,
                e,
            )),
        }
    }
}
