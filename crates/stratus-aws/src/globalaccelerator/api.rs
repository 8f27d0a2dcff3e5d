//! Global Accelerator client interface

use async_trait::async_trait;
use stratus_core::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRange {
    pub from_port: i64,
    pub to_port: i64,
}

#[derive(Debug, Clone)]
pub struct ListenerDescription {
    pub listener_arn: String,
    pub protocol: String,
    pub port_ranges: Vec<PortRange>,
    pub client_affinity: String,
}

#[derive(Debug, Clone)]
pub struct AcceleratorDescription {
    pub accelerator_arn: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct CreateListenerInput {
    pub accelerator_arn: String,
    pub protocol: String,
    pub port_ranges: Vec<PortRange>,
    pub client_affinity: String,
}

#[derive(Debug, Clone)]
pub struct DescribeListenerInput {
    pub listener_arn: String,
}

#[derive(Debug, Clone)]
pub struct UpdateListenerInput {
    pub listener_arn: String,
    pub protocol: String,
    pub port_ranges: Vec<PortRange>,
    pub client_affinity: String,
}

#[derive(Debug, Clone)]
pub struct DeleteListenerInput {
    pub listener_arn: String,
}

#[derive(Debug, Clone)]
pub struct DescribeAcceleratorInput {
    pub accelerator_arn: String,
}

/// Opaque Global Accelerator transport
#[async_trait]
pub trait GlobalAcceleratorApi: Send + Sync {
    async fn create_listener(
        &self,
        input: CreateListenerInput,
    ) -> Result<ListenerDescription, ApiError>;

    async fn describe_listener(
        &self,
        input: DescribeListenerInput,
    ) -> Result<ListenerDescription, ApiError>;

    async fn update_listener(
        &self,
        input: UpdateListenerInput,
    ) -> Result<ListenerDescription, ApiError>;

    async fn delete_listener(&self, input: DeleteListenerInput) -> Result<(), ApiError>;

    async fn describe_accelerator(
        &self,
        input: DescribeAcceleratorInput,
    ) -> Result<AcceleratorDescription, ApiError>;
}
