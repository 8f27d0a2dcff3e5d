//! Pinpoint client interface

use async_trait::async_trait;
use stratus_core::ApiError;

#[derive(Debug, Clone)]
pub struct EventStreamDescription {
    pub application_id: String,
    pub destination_stream_arn: String,
    pub role_arn: String,
}

#[derive(Debug, Clone)]
pub struct PutEventStreamInput {
    pub application_id: String,
    pub destination_stream_arn: String,
    pub role_arn: String,
}

#[derive(Debug, Clone)]
pub struct GetEventStreamInput {
    pub application_id: String,
}

#[derive(Debug, Clone)]
pub struct DeleteEventStreamInput {
    pub application_id: String,
}

/// Opaque Pinpoint transport
#[async_trait]
pub trait PinpointApi: Send + Sync {
    async fn put_event_stream(
        &self,
        input: PutEventStreamInput,
    ) -> Result<EventStreamDescription, ApiError>;

    async fn get_event_stream(
        &self,
        input: GetEventStreamInput,
    ) -> Result<EventStreamDescription, ApiError>;

    async fn delete_event_stream(&self, input: DeleteEventStreamInput) -> Result<(), ApiError>;
}
