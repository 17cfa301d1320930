use std::collections::BTreeMap;

use topo_core::decorator::CompanionResourceDecorator;
use topo_core::discovery::DiscoveryInfo;
use topo_core::function::FunctionDescriptor;
use topo_core::graph::{DeletionPolicy, Resource, S3_BUCKET_RESOURCE_TYPE};
use topo_core::permission::{InvocationType, MessageBodyStorage, Permission, ReceiptRule};
use topo_core::privilege::RoleDefinition;
use topo_core::reference::ResourceRef;
use topo_core::topology::{ResolvedTopology, TopologyBuilder, TopologyConfig};

fn mail_topology() -> (ResolvedTopology, String, String) {
    let storage = MessageBodyStorage::allocate("Special");
    let bucket_name = storage.logical_name().to_string();

    let mut descriptor =
        FunctionDescriptor::register("handlers::echo_ses_event", RoleDefinition::new());
    descriptor.add_permission(Permission::Ses {
        source: ResourceRef::literal("*"),
        invocation_type: InvocationType::Event,
        receipt_rules: vec![ReceiptRule::new("Default", &[])],
        message_body_storage: Some(storage),
    });
    let function_name = descriptor.logical_name().to_string();

    let mut builder = TopologyBuilder::new(TopologyConfig::named("Mail"));
    builder.add(descriptor);
    let topology = builder.build().expect("build should succeed");
    (topology, function_name, bucket_name)
}

#[test]
fn published_record_carries_physical_bucket_identifier() {
    let (topology, function_name, bucket_name) = mail_topology();
    let physical_ids = BTreeMap::from([(bucket_name.clone(), "mail-bodies-7f3a".to_string())]);

    let info = DiscoveryInfo::publish(&topology, &function_name, &physical_ids);
    let bucket = info
        .lookup_one(S3_BUCKET_RESOURCE_TYPE)
        .expect("single bucket should not be ambiguous")
        .expect("bucket should be published");
    assert_eq!(bucket.logical_name, bucket_name);
    assert_eq!(bucket.reference(), Some("mail-bodies-7f3a"));
}

#[test]
fn record_round_trips_through_json() {
    let (topology, function_name, bucket_name) = mail_topology();
    let info = DiscoveryInfo::publish(&topology, &function_name, &BTreeMap::new());

    let serialized = serde_json::to_string(&info).expect("record should serialize");
    let decoded: DiscoveryInfo =
        serde_json::from_str(&serialized).expect("record should deserialize");
    assert_eq!(decoded, info);
    assert!(decoded.resources.contains_key(&bucket_name));
}

#[test]
fn handler_only_sees_its_own_dependencies() {
    let mut mail = FunctionDescriptor::register("handlers::echo_ses_event", RoleDefinition::new());
    mail.add_permission(Permission::Ses {
        source: ResourceRef::literal("*"),
        invocation_type: InvocationType::Event,
        receipt_rules: vec![ReceiptRule::new("Default", &[])],
        message_body_storage: Some(MessageBodyStorage::allocate("Special")),
    });
    let mail_name = mail.logical_name().to_string();

    let mut unrelated =
        FunctionDescriptor::register("handlers::echo_s3_event", RoleDefinition::new());
    unrelated.add_decorator(CompanionResourceDecorator::new(
        "UnrelatedBucket",
        Resource::s3_bucket().with_deletion_policy(DeletionPolicy::Delete),
    ));

    let mut builder = TopologyBuilder::new(TopologyConfig::named("TwoFunctions"));
    builder.add(mail).add(unrelated);
    let topology = builder.build().expect("build should succeed");

    let info = DiscoveryInfo::publish(&topology, &mail_name, &BTreeMap::new());
    assert!(!info.resources.contains_key("UnrelatedBucket"));
    assert_eq!(info.lookup(S3_BUCKET_RESOURCE_TYPE).len(), 1);
}
