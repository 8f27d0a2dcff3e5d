//! Direct Connect client interface

use async_trait::async_trait;
use stratus_core::ApiError;

#[derive(Debug, Clone)]
pub struct AssociationDescription {
    pub association_id: String,
    pub dx_gateway_id: String,
    pub associated_gateway_id: String,
    pub association_state: String,
}

#[derive(Debug, Clone)]
pub struct CreateGatewayAssociationInput {
    pub dx_gateway_id: String,
    pub gateway_id: String,
}

#[derive(Debug, Clone)]
pub struct CreateGatewayAssociationOutput {
    pub association: AssociationDescription,
}

#[derive(Debug, Clone, Default)]
pub struct DescribeGatewayAssociationsInput {
    pub association_id: Option<String>,
    pub dx_gateway_id: Option<String>,
    pub associated_gateway_id: Option<String>,
    /// Legacy reverse index: list by the virtual gateway when the caller
    /// cannot list by the association itself
    pub virtual_gateway_id: Option<String>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DescribeGatewayAssociationsOutput {
    pub associations: Vec<AssociationDescription>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteGatewayAssociationInput {
    pub association_id: String,
}

/// Opaque Direct Connect transport
#[async_trait]
pub trait DirectConnectApi: Send + Sync {
    async fn create_gateway_association(
        &self,
        input: CreateGatewayAssociationInput,
    ) -> Result<CreateGatewayAssociationOutput, ApiError>;

    async fn describe_gateway_associations(
        &self,
        input: DescribeGatewayAssociationsInput,
    ) -> Result<DescribeGatewayAssociationsOutput, ApiError>;

    async fn delete_gateway_association(
        &self,
        input: DeleteGatewayAssociationInput,
    ) -> Result<(), ApiError>;
}
