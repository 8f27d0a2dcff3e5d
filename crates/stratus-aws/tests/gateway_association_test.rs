mod common;

use common::{FakeDirectConnect, context, registry};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use stratus_aws::directconnect::DirectConnectApi;
use stratus_aws::directconnect::gateway_association::GatewayAssociation;
use stratus_core::{Driver, ProviderContext, RawState, ResourceLifecycle, upgrade_state};
use stratus_schema::AttrValue;

fn harness(fake: Arc<FakeDirectConnect>) -> (Driver, ProviderContext) {
    let ctx = context(
        registry()
            .register::<dyn DirectConnectApi>(common::REGION, fake as Arc<dyn DirectConnectApi>),
    );
    (Driver::new(Arc::new(GatewayAssociation)), ctx)
}

fn config() -> BTreeMap<String, AttrValue> {
    let mut config = BTreeMap::new();
    config.insert("dx_gateway_id".to_string(), AttrValue::from("dxgw-1"));
    config.insert("associated_gateway_id".to_string(), AttrValue::from("tgw-1"));
    config
}

#[tokio::test(start_paused = true)]
async fn test_create_waits_until_associated() {
    let fake = Arc::new(FakeDirectConnect::with_transitions(3, 0));
    let (driver, ctx) = harness(fake);

    let created = driver.create(config(), &ctx).await.unwrap();
    assert_eq!(created.id(), Some("ga-0"));
    assert_eq!(created.get_string("association_state"), Some("associated"));
    assert_eq!(created.get_string("dx_gateway_association_id"), Some("ga-0"));
}

#[tokio::test(start_paused = true)]
async fn test_delete_waits_until_gone() {
    let fake = Arc::new(FakeDirectConnect::with_transitions(0, 2));
    let id = fake.seed_associated("dxgw-1", "tgw-1", false);
    let (driver, ctx) = harness(fake.clone());

    let deleted = driver.delete(&id, BTreeMap::new(), &ctx).await.unwrap();
    assert!(deleted.id().is_none());
    assert!(fake.associations.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delete_already_gone_is_success() {
    let fake = Arc::new(FakeDirectConnect::default());
    let (driver, ctx) = harness(fake);

    let deleted = driver
        .delete("ga-ghost", BTreeMap::new(), &ctx)
        .await
        .unwrap();
    assert!(deleted.id().is_none());
}

#[tokio::test]
async fn test_v0_upgrade_discovers_association_id() {
    let fake = Arc::new(FakeDirectConnect::default());
    let id = fake.seed_associated("dxgw-1", "vgw-1", false);
    let (_, ctx) = harness(fake);

    let mut raw = RawState::new();
    raw.insert("dx_gateway_id".to_string(), json!("dxgw-1"));
    raw.insert("vpn_gateway_id".to_string(), json!("vgw-1"));

    let resource = GatewayAssociation;
    let upgraded = upgrade_state(
        resource.type_name(),
        raw,
        0,
        resource.schema_version(),
        &resource.upgraders(),
        &ctx,
    )
    .await
    .unwrap();

    assert_eq!(upgraded.get("dx_gateway_association_id"), Some(&json!(id)));
    assert_eq!(
        upgraded.get("associated_gateway_id"),
        Some(&Value::String("vgw-1".to_string()))
    );
    assert!(!upgraded.contains_key("vpn_gateway_id"));
}

#[tokio::test]
async fn test_v0_upgrade_falls_back_to_reverse_index() {
    // cross-account association only visible through the virtual gateway
    let fake = Arc::new(FakeDirectConnect::default());
    let id = fake.seed_associated("dxgw-1", "vgw-1", true);
    let (_, ctx) = harness(fake);

    let mut raw = RawState::new();
    raw.insert("dx_gateway_id".to_string(), json!("dxgw-1"));
    raw.insert("vpn_gateway_id".to_string(), json!("vgw-1"));

    let resource = GatewayAssociation;
    let upgraded = upgrade_state(
        resource.type_name(),
        raw,
        0,
        resource.schema_version(),
        &resource.upgraders(),
        &ctx,
    )
    .await
    .unwrap();
    assert_eq!(upgraded.get("dx_gateway_association_id"), Some(&json!(id)));
}
