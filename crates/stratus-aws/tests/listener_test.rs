mod common;

use common::{FakeGlobalAccelerator, context, registry};
use std::collections::BTreeMap;
use std::sync::Arc;
use stratus_aws::globalaccelerator::GlobalAcceleratorApi;
use stratus_aws::globalaccelerator::listener::{Listener, accelerator_arn_from_listener_arn};
use stratus_core::{Driver, ProviderContext, ProviderError};
use stratus_schema::AttrValue;

const ACCELERATOR_ARN: &str =
    "arn:aws:globalaccelerator::123456789012:accelerator/a1b2c3d4";

fn harness(fake: Arc<FakeGlobalAccelerator>) -> (Driver, ProviderContext) {
    let ctx = context(
        registry().register::<dyn GlobalAcceleratorApi>(
            common::REGION,
            fake as Arc<dyn GlobalAcceleratorApi>,
        ),
    );
    (Driver::new(Arc::new(Listener)), ctx)
}

fn port_range(from_port: i64, to_port: i64) -> BTreeMap<String, AttrValue> {
    let mut block = BTreeMap::new();
    block.insert("from_port".to_string(), AttrValue::from(from_port));
    block.insert("to_port".to_string(), AttrValue::from(to_port));
    block
}

fn config(ranges: Vec<BTreeMap<String, AttrValue>>) -> BTreeMap<String, AttrValue> {
    let mut config = BTreeMap::new();
    config.insert(
        "accelerator_arn".to_string(),
        AttrValue::from(ACCELERATOR_ARN),
    );
    config.insert("protocol".to_string(), AttrValue::from("TCP"));
    config.insert("port_range".to_string(), AttrValue::Block(ranges));
    config
}

#[tokio::test(start_paused = true)]
async fn test_create_waits_for_deployment() {
    let fake = Arc::new(FakeGlobalAccelerator::with_deploy_polls(3));
    let (driver, ctx) = harness(fake);

    let created = driver
        .create(config(vec![port_range(80, 80), port_range(443, 443)]), &ctx)
        .await
        .unwrap();
    let id = created.id().unwrap();
    assert!(id.starts_with(ACCELERATOR_ARN));
    assert_eq!(created.get_string("accelerator_arn"), Some(ACCELERATOR_ARN));
    // default applied by the schema
    assert_eq!(created.get_string("client_affinity"), Some("NONE"));
    match created.get("port_range") {
        Some(AttrValue::Block(blocks)) => assert_eq!(blocks.len(), 2),
        other => panic!("expected port_range block, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_update_port_ranges_redeploys() {
    let fake = Arc::new(FakeGlobalAccelerator::with_deploy_polls(2));
    let (driver, ctx) = harness(fake.clone());

    let created = driver
        .create(config(vec![port_range(80, 80)]), &ctx)
        .await
        .unwrap();
    let updated = driver
        .update(
            created.id().unwrap(),
            created.values().clone(),
            config(vec![port_range(8080, 8081)]),
            &ctx,
        )
        .await
        .unwrap();
    match updated.get("port_range") {
        Some(AttrValue::Block(blocks)) => {
            assert_eq!(blocks[0].get("from_port"), Some(&AttrValue::from(8080i64)));
        }
        other => panic!("expected port_range block, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_delete_waits_for_deployment() {
    let fake = Arc::new(FakeGlobalAccelerator::with_deploy_polls(2));
    let (driver, ctx) = harness(fake.clone());

    let created = driver
        .create(config(vec![port_range(80, 80)]), &ctx)
        .await
        .unwrap();
    let deleted = driver
        .delete(created.id().unwrap(), created.values().clone(), &ctx)
        .await
        .unwrap();
    assert!(deleted.id().is_none());
    assert!(fake.listeners.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delete_already_gone_is_success() {
    let fake = Arc::new(FakeGlobalAccelerator::default());
    let (driver, ctx) = harness(fake);

    let deleted = driver
        .delete(
            &format!("{ACCELERATOR_ARN}/listener/l-ghost"),
            BTreeMap::new(),
            &ctx,
        )
        .await
        .unwrap();
    assert!(deleted.id().is_none());
}

#[test]
fn test_accelerator_arn_derivation() {
    let listener_arn = format!("{ACCELERATOR_ARN}/listener/l-0");
    assert_eq!(
        accelerator_arn_from_listener_arn(&listener_arn).unwrap(),
        ACCELERATOR_ARN
    );

    let err = accelerator_arn_from_listener_arn("arn:aws:ec2:::instance/i-1").unwrap_err();
    assert!(matches!(err, ProviderError::InvalidId { .. }));
}
