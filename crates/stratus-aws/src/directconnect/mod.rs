//! AWS Direct Connect

pub mod api;
pub mod gateway_association;

pub use api::DirectConnectApi;
pub use gateway_association::GatewayAssociation;
