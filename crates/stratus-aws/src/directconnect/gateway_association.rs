//! Direct Connect gateway association
//!
//! Associates a Direct Connect gateway with a VPN or transit gateway. The
//! association forms asynchronously (associating → associated) and tears
//! down the same way (disassociating → gone).
//!
//! Schema version 1: version 0 state identified the association only by
//! its gateway pair; the upgrader discovers the association id from the
//! remote and stores it as `dx_gateway_association_id`.

use crate::directconnect::api::{
    AssociationDescription, CreateGatewayAssociationInput, DeleteGatewayAssociationInput,
    DescribeGatewayAssociationsInput, DirectConnectApi,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use stratus_core::{
    FindResult, FinderError, ProviderContext, ProviderError, RawState, ResourceLifecycle,
    StateChange, StateUpgrade, not_found_ok, wait_for_deletion, wait_for_state,
};
use stratus_schema::{AttrType, Attribute, Operation, ResourceData, Schema, Timeouts};

const STATE_ASSOCIATING: &str = "associating";
const STATE_ASSOCIATED: &str = "associated";
const STATE_DISASSOCIATING: &str = "disassociating";

/// Resolve an association by its id, paging the describe API
pub async fn find_gateway_association(
    client: &Arc<dyn DirectConnectApi>,
    association_id: &str,
) -> FindResult<AssociationDescription> {
    find_with(
        client,
        DescribeGatewayAssociationsInput {
            association_id: Some(association_id.to_string()),
            ..Default::default()
        },
    )
    .await
}

/// Resolve an association by its gateway pair, falling back to the
/// virtual-gateway reverse index for cross-account associations the
/// owning account cannot list directly
pub async fn find_gateway_association_by_gateways(
    client: &Arc<dyn DirectConnectApi>,
    dx_gateway_id: &str,
    associated_gateway_id: &str,
) -> FindResult<AssociationDescription> {
    let direct = find_with(
        client,
        DescribeGatewayAssociationsInput {
            dx_gateway_id: Some(dx_gateway_id.to_string()),
            associated_gateway_id: Some(associated_gateway_id.to_string()),
            ..Default::default()
        },
    )
    .await;

    match direct {
        Err(FinderError::NotFound) => {
            find_with(
                client,
                DescribeGatewayAssociationsInput {
                    virtual_gateway_id: Some(associated_gateway_id.to_string()),
                    ..Default::default()
                },
            )
            .await
        }
        other => other,
    }
}

async fn find_with(
    client: &Arc<dyn DirectConnectApi>,
    mut input: DescribeGatewayAssociationsInput,
) -> FindResult<AssociationDescription> {
    loop {
        let output = client
            .describe_gateway_associations(input.clone())
            .await
            .map_err(FinderError::Api)?;
        if let Some(association) = output.associations.into_iter().next() {
            return Ok(association);
        }
        match output.next_token {
            Some(token) => input.next_token = Some(token),
            None => return Err(FinderError::NotFound),
        }
    }
}

fn refresh_by_id(
    client: Arc<dyn DirectConnectApi>,
    association_id: String,
) -> impl FnMut() -> std::pin::Pin<
    Box<
        dyn std::future::Future<
                Output = Result<Option<(AssociationDescription, String)>, stratus_core::ApiError>,
            > + Send,
    >,
> {
    move || {
        let client = client.clone();
        let association_id = association_id.clone();
        Box::pin(async move {
            let found = not_found_ok(find_gateway_association(&client, &association_id).await)?;
            Ok(found.map(|a| {
                let state = a.association_state.clone();
                (a, state)
            }))
        })
    }
}

pub struct GatewayAssociation;

/// v0 → v1: discover the association id the old state shape never stored
pub struct GatewayAssociationUpgradeV0;

#[async_trait]
impl StateUpgrade for GatewayAssociationUpgradeV0 {
    fn from_version(&self) -> u64 {
        0
    }

    async fn upgrade(
        &self,
        mut raw: RawState,
        ctx: &ProviderContext,
    ) -> Result<RawState, ProviderError> {
        let dx_gateway_id = raw
            .get("dx_gateway_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        // v0 predates transit gateway support; the associated gateway was
        // always a VPN gateway
        let associated_gateway_id = raw
            .remove("vpn_gateway_id")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let client = ctx.client::<dyn DirectConnectApi>()?;
        let association =
            find_gateway_association_by_gateways(&client, &dx_gateway_id, &associated_gateway_id)
                .await
                .map_err(|e| ProviderError::Upgrade {
                    resource: "aws_dx_gateway_association".to_string(),
                    from: 0,
                    message: format!(
                        "cannot discover association id for ({dx_gateway_id}, {associated_gateway_id}): {e}"
                    ),
                })?;

        raw.insert(
            "associated_gateway_id".to_string(),
            Value::String(associated_gateway_id),
        );
        raw.insert(
            "dx_gateway_association_id".to_string(),
            Value::String(association.association_id),
        );
        Ok(raw)
    }
}

#[async_trait]
impl ResourceLifecycle for GatewayAssociation {
    fn type_name(&self) -> &'static str {
        "aws_dx_gateway_association"
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::new(
            Schema::new()
                .attr(
                    "dx_gateway_id",
                    Attribute::required(AttrType::String).force_new(),
                )
                .attr(
                    "associated_gateway_id",
                    Attribute::required(AttrType::String).force_new(),
                )
                .attr(
                    "dx_gateway_association_id",
                    Attribute::computed(AttrType::String),
                )
                .attr("association_state", Attribute::computed(AttrType::String)),
        )
    }

    fn schema_version(&self) -> u64 {
        1
    }

    fn upgraders(&self) -> Vec<Arc<dyn StateUpgrade>> {
        vec![Arc::new(GatewayAssociationUpgradeV0)]
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
            .with_create(Duration::from_secs(30 * 60))
            .with_delete(Duration::from_secs(30 * 60))
    }

    async fn create(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn DirectConnectApi>()?;
        let dx_gateway_id = data.get_string("dx_gateway_id").unwrap_or_default().to_string();
        let gateway_id = data
            .get_string("associated_gateway_id")
            .unwrap_or_default()
            .to_string();

        let output = client
            .create_gateway_association(CreateGatewayAssociationInput {
                dx_gateway_id: dx_gateway_id.clone(),
                gateway_id,
            })
            .await
            .map_err(|e| {
                ProviderError::api(self.type_name(), &dx_gateway_id, Operation::Create, e)
            })?;

        let association_id = output.association.association_id;
        data.set_id(association_id.clone());

        let conf = StateChange::new(
            &[STATE_ASSOCIATING],
            &[STATE_ASSOCIATED],
            data.timeout(Operation::Create),
        )
        .with_poll_interval(Duration::from_secs(10));
        wait_for_state(&conf, refresh_by_id(client, association_id.clone()))
            .await
            .map_err(|e| e.for_resource(self.type_name(), &association_id, Operation::Create))?;
        Ok(())
    }

    async fn read(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn DirectConnectApi>()?;
        let association_id = data.id().unwrap_or_default().to_string();

        match find_gateway_association(&client, &association_id).await {
            Ok(association) => {
                data.set("dx_gateway_id", association.dx_gateway_id)?;
                data.set("associated_gateway_id", association.associated_gateway_id)?;
                data.set("dx_gateway_association_id", association.association_id)?;
                data.set("association_state", association.association_state)?;
                Ok(())
            }
            Err(FinderError::NotFound) => {
                Err(ProviderError::not_found(self.type_name(), association_id))
            }
            Err(FinderError::Api(e)) => Err(ProviderError::api(
                self.type_name(),
                association_id,
                Operation::Read,
                e,
            )),
        }
    }

    async fn delete(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn DirectConnectApi>()?;
        let association_id = data.id().unwrap_or_default().to_string();

        match not_found_ok(find_gateway_association(&client, &association_id).await) {
            Ok(Some(_)) => {}
            Ok(None) => return Err(ProviderError::not_found(self.type_name(), association_id)),
            Err(e) => {
                return Err(ProviderError::api(
                    self.type_name(),
                    association_id,
                    Operation::Delete,
                    e,
                ));
            }
        }

        client
            .delete_gateway_association(DeleteGatewayAssociationInput {
                association_id: association_id.clone(),
            })
            .await
            .map_err(|e| {
                ProviderError::api(self.type_name(), &association_id, Operation::Delete, e)
            })?;

        let refresh = refresh_by_id(client, association_id.clone());
        wait_for_deletion(
            &[STATE_DISASSOCIATING, STATE_ASSOCIATED],
            data.timeout(Operation::Delete),
            Duration::from_secs(10),
            refresh,
        )
        .await
        .map_err(|e| e.for_resource(self.type_name(), &association_id, Operation::Delete))
    }
}
