//! Global Accelerator listener
//!
//! Every mutation of a listener flips its accelerator to IN_PROGRESS while
//! the change propagates across the edge fleet, so create, update and
//! delete all finish by waiting for the accelerator to return to DEPLOYED.

use crate::globalaccelerator::api::{
    AcceleratorDescription, CreateListenerInput, DeleteListenerInput, DescribeAcceleratorInput,
    DescribeListenerInput, GlobalAcceleratorApi, ListenerDescription, PortRange,
    UpdateListenerInput,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use stratus_core::{
    FindResult, FinderError, ProviderContext, ProviderError, ResourceLifecycle, StateChange,
    is_not_found, wait_for_state,
};
use stratus_schema::{AttrType, AttrValue, Attribute, Operation, ResourceData, Schema};

const NOT_FOUND_CODES: &[&str] = &["ListenerNotFoundException", "AcceleratorNotFoundException"];

const ACCELERATOR_IN_PROGRESS: &str = "IN_PROGRESS";
const ACCELERATOR_DEPLOYED: &str = "DEPLOYED";

pub async fn find_listener(
    client: &Arc<dyn GlobalAcceleratorApi>,
    listener_arn: &str,
) -> FindResult<ListenerDescription> {
    client
        .describe_listener(DescribeListenerInput {
            listener_arn: listener_arn.to_string(),
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

/// The accelerator ARN is the listener ARN's prefix
pub fn accelerator_arn_from_listener_arn(listener_arn: &str) -> Result<&str, ProviderError> {
    match listener_arn.split("/listener/").next() {
        Some(arn) if arn != listener_arn => Ok(arn),
        _ => Err(ProviderError::InvalidId {
            id: listener_arn.to_string(),
            expected: "<accelerator-arn>/listener/<suffix>".to_string(),
        }),
    }
}

async fn wait_accelerator_deployed(
    client: &Arc<dyn GlobalAcceleratorApi>,
    accelerator_arn: &str,
    timeout: Duration,
) -> Result<AcceleratorDescription, stratus_core::WaitError> {
    let conf = StateChange::new(
        &[ACCELERATOR_IN_PROGRESS],
        &[ACCELERATOR_DEPLOYED],
        timeout,
    )
    .with_poll_interval(Duration::from_secs(10));
    let found = wait_for_state(&conf, || {
        let client = client.clone();
        let accelerator_arn = accelerator_arn.to_string();
        async move {
            let accelerator = client
                .describe_accelerator(DescribeAcceleratorInput { accelerator_arn })
                .await?;
            let status = accelerator.status.clone();
            Ok(Some((accelerator, status)))
        }
    })
    .await?;
    found.ok_or(stratus_core::WaitError::TimedOut { last_state: None })
}

fn port_ranges_from_data(data: &ResourceData) -> Vec<PortRange> {
    match data.get("port_range") {
        Some(AttrValue::Block(blocks)) => blocks
            .iter()
            .map(|b| PortRange {
                from_port: b.get("from_port").and_then(AttrValue::as_int).unwrap_or(0),
                to_port: b.get("to_port").and_then(AttrValue::as_int).unwrap_or(0),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn port_ranges_to_value(port_ranges: &[PortRange]) -> AttrValue {
    AttrValue::Block(
        port_ranges
            .iter()
            .map(|r| {
                let mut block = BTreeMap::new();
                block.insert("from_port".to_string(), AttrValue::from(r.from_port));
                block.insert("to_port".to_string(), AttrValue::from(r.to_port));
                block
            })
            .collect(),
    )
}

pub struct Listener;

#[async_trait]
impl ResourceLifecycle for Listener {
    fn type_name(&self) -> &'static str {
        "aws_globalaccelerator_listener"
    }

    fn schema(&self) -> Arc<Schema> {
        let port_range = Arc::new(
            Schema::new()
                .attr("from_port", Attribute::required(AttrType::Int))
                .attr("to_port", Attribute::required(AttrType::Int)),
        );
        Arc::new(
            Schema::new()
                .attr(
                    "accelerator_arn",
                    Attribute::required(AttrType::String).force_new(),
                )
                .attr("protocol", Attribute::required(AttrType::String))
                .attr(
                    "client_affinity",
                    Attribute::optional(AttrType::String).with_default(AttrValue::from("NONE")),
                )
                .attr("port_range", Attribute::required(AttrType::Block(port_range))),
        )
    }

    async fn create(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn GlobalAcceleratorApi>()?;
        let accelerator_arn = data
            .get_string("accelerator_arn")
            .unwrap_or_default()
            .to_string();

        let listener = client
            .create_listener(CreateListenerInput {
                accelerator_arn: accelerator_arn.clone(),
                protocol: data.get_string("protocol").unwrap_or_default().to_string(),
                port_ranges: port_ranges_from_data(data),
                client_affinity: data
                    .get_string("client_affinity")
                    .unwrap_or_default()
                    .to_string(),
            })
            .await
            .map_err(|e| {
                ProviderError::api(self.type_name(), &accelerator_arn, Operation::Create, e)
            })?;

        data.set_id(listener.listener_arn.clone());

        wait_accelerator_deployed(&client, &accelerator_arn, data.timeout(Operation::Create))
            .await
            .map_err(|e| {
                e.for_resource(self.type_name(), &listener.listener_arn, Operation::Create)
            })?;
        Ok(())
    }

    async fn read(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn GlobalAcceleratorApi>()?;
        let listener_arn = data.id().unwrap_or_default().to_string();

        match find_listener(&client, &listener_arn).await {
            Ok(listener) => {
                let accelerator_arn = accelerator_arn_from_listener_arn(&listener.listener_arn)?;
                data.set("accelerator_arn", accelerator_arn)?;
                data.set("protocol", listener.protocol)?;
                data.set("client_affinity", listener.client_affinity)?;
                data.set("port_range", port_ranges_to_value(&listener.port_ranges))?;
                Ok(())
            }
            Err(FinderError::NotFound) => {
                Err(ProviderError::not_found(self.type_name(), listener_arn))
            }
            Err(FinderError::Api(e)) => Err(ProviderError::api(
                self.type_name(),
                listener_arn,
                Operation::Read,
                e,
            )),
        }
    }

    async fn update(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn GlobalAcceleratorApi>()?;
        let listener_arn = data.id().unwrap_or_default().to_string();
        let accelerator_arn = accelerator_arn_from_listener_arn(&listener_arn)?.to_string();

        client
            .update_listener(UpdateListenerInput {
                listener_arn: listener_arn.clone(),
                protocol: data.get_string("protocol").unwrap_or_default().to_string(),
                port_ranges: port_ranges_from_data(data),
                client_affinity: data
                    .get_string("client_affinity")
                    .unwrap_or_default()
                    .to_string(),
            })
            .await
            .map_err(|e| {
                ProviderError::api(self.type_name(), &listener_arn, Operation::Update, e)
            })?;

        wait_accelerator_deployed(&client, &accelerator_arn, data.timeout(Operation::Update))
            .await
            .map_err(|e| e.for_resource(self.type_name(), &listener_arn, Operation::Update))?;
        Ok(())
    }

    async fn delete(
        &self,
        data: &mut ResourceData,
        ctx: &ProviderContext,
    ) -> Result<(), ProviderError> {
        let client = ctx.client::<dyn GlobalAcceleratorApi>()?;
        let listener_arn = data.id().unwrap_or_default().to_string();
        let accelerator_arn = accelerator_arn_from_listener_arn(&listener_arn)?.to_string();

        match client
            .delete_listener(DeleteListenerInput {
                listener_arn: listener_arn.clone(),
            })
            .await
        {
            Ok(()) => {}
            Err(e) if is_not_found(&e, NOT_FOUND_CODES) => {
                return Err(ProviderError::not_found(self.type_name(), listener_arn));
            }
            Err(e) => {
                return Err(ProviderError::api(
                    self.type_name(),
                    listener_arn,
                    Operation::Delete,
                    e,
                ));
            }
        }

        wait_accelerator_deployed(&client, &accelerator_arn, data.timeout(Operation::Delete))
            .await
            .map_err(|e| e.for_resource(self.type_name(), &listener_arn, Operation::Delete))?;
        Ok(())
    }
}
