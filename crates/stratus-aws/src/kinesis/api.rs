//! Kinesis client interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stratus_core::ApiError;

#[derive(Debug, Clone)]
pub struct ConsumerDescription {
    pub consumer_arn: String,
    pub consumer_name: String,
    pub stream_arn: String,
    pub status: String,
    pub creation_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RegisterStreamConsumerInput {
    pub stream_arn: String,
    pub consumer_name: String,
}

#[derive(Debug, Clone)]
pub struct RegisterStreamConsumerOutput {
    pub consumer: ConsumerDescription,
}

#[derive(Debug, Clone, Default)]
pub struct DescribeStreamConsumerInput {
    pub consumer_arn: Option<String>,
    pub consumer_name: Option<String>,
    pub stream_arn: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeregisterStreamConsumerInput {
    pub consumer_arn: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListStreamsInput {
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListStreamsOutput {
    pub stream_arns: Vec<String>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListStreamConsumersInput {
    pub stream_arn: String,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListStreamConsumersOutput {
    pub consumers: Vec<ConsumerDescription>,
    pub next_token: Option<String>,
}

/// Opaque Kinesis transport
#[async_trait]
pub trait KinesisApi: Send + Sync {
    async fn register_stream_consumer(
        &self,
        input: RegisterStreamConsumerInput,
    ) -> Result<RegisterStreamConsumerOutput, ApiError>;

    async fn describe_stream_consumer(
        &self,
        input: DescribeStreamConsumerInput,
    ) -> Result<ConsumerDescription, ApiError>;

    async fn deregister_stream_consumer(
        &self,
        input: DeregisterStreamConsumerInput,
    ) -> Result<(), ApiError>;

    async fn list_streams(&self, input: ListStreamsInput) -> Result<ListStreamsOutput, ApiError>;

    async fn list_stream_consumers(
        &self,
        input: ListStreamConsumersInput,
    ) -> Result<ListStreamConsumersOutput, ApiError>;
}
