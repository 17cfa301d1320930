use topo_core::decorator::{CompanionResourceDecorator, DecoratorOutput};
use topo_core::error::TopologyError;
use topo_core::event_source::{EventSourceMapping, StartingPosition};
use topo_core::function::{FunctionDescriptor, FunctionOptions};
use topo_core::graph::{DeletionPolicy, Edge, Resource, ResourceGraph, S3_BUCKET_RESOURCE_TYPE};
use topo_core::permission::{InvocationType, MessageBodyStorage, Permission, ReceiptRule};
use topo_core::privilege::{IamPrivilege, RoleDefinition};
use topo_core::reference::ResourceRef;
use topo_core::topology::{TopologyBuilder, TopologyConfig};

const KINESIS_STREAM: &str = "arn:aws:kinesis:us-west-2:123412341234:stream/X";

#[test]
fn pull_binding_survives_build_unchanged() {
    let mut descriptor =
        FunctionDescriptor::register("handlers::echo_stream_event", RoleDefinition::new());
    descriptor.add_event_source_mapping(EventSourceMapping::new(
        ResourceRef::literal(KINESIS_STREAM),
        StartingPosition::TrimHorizon,
        10,
    ));
    let function_name = descriptor.logical_name().to_string();

    let mut builder = TopologyBuilder::new(TopologyConfig::named("PullBinding"));
    builder.add(descriptor);
    let topology = builder.build().expect("build should succeed");

    let function = topology
        .function(&function_name)
        .expect("function should be resolved");
    assert_eq!(function.event_source_mappings.len(), 1);
    let mapping = &function.event_source_mappings[0];
    assert_eq!(mapping.stream_arn, KINESIS_STREAM);
    assert_eq!(mapping.starting_position, StartingPosition::TrimHorizon);
    assert_eq!(mapping.batch_size, 10);
    assert!(mapping.enabled);
    assert!(function.invoke_grants.is_empty());
}

#[test]
fn decorator_bucket_with_deferred_permission_resolves_after_build() {
    let mut descriptor =
        FunctionDescriptor::register("handlers::echo_dynamic_bucket_event", RoleDefinition::new());
    descriptor
        .add_decorator(CompanionResourceDecorator::new(
            "BucketA",
            Resource::s3_bucket().with_deletion_policy(DeletionPolicy::Delete),
        ))
        .add_permission(Permission::S3 {
            source: ResourceRef::deferred("BucketA"),
            events: vec!["s3:ObjectCreated:*".to_string()],
        })
        .add_dependency("BucketA");
    descriptor.role = RoleDefinition::new().with_privilege(IamPrivilege::new(
        &["s3:GetObject", "s3:HeadObject"],
        ResourceRef::deferred("BucketA"),
    ));
    let function_name = descriptor.logical_name().to_string();

    let mut builder = TopologyBuilder::new(TopologyConfig::named("DynamicBucket"));
    builder.add(descriptor);
    let topology = builder.build().expect("build should succeed");

    let function = topology
        .function(&function_name)
        .expect("function should be resolved");
    assert_eq!(function.invoke_grants[0].source_arn, "BucketA");
    assert_eq!(function.privileges[0].resource, "BucketA");
    assert!(topology.graph.has_edge(&function_name, "BucketA"));
    assert_eq!(
        topology.graph.get("BucketA").map(|r| r.deletion_policy),
        Some(DeletionPolicy::Delete)
    );
}

#[test]
fn provisioning_order_places_dependencies_first() {
    let mut producer =
        FunctionDescriptor::register("handlers::produce_topic", RoleDefinition::new());
    producer.add_decorator(CompanionResourceDecorator::new(
        "SharedTopic",
        Resource::sns_topic(),
    ));
    let producer_name = producer.logical_name().to_string();

    let mut consumer =
        FunctionDescriptor::register("handlers::consume_topic", RoleDefinition::new());
    consumer
        .add_permission(Permission::Sns {
            source: ResourceRef::deferred("SharedTopic"),
        })
        .add_dependency("SharedTopic")
        .add_dependency(&producer_name);
    let consumer_name = consumer.logical_name().to_string();

    let mut builder = TopologyBuilder::new(TopologyConfig::named("Ordered"));
    builder.add(consumer).add(producer);
    let topology = builder.build().expect("build should succeed");

    let position = |name: &str| {
        topology
            .provisioning_order
            .iter()
            .position(|entry| entry == name)
            .expect("name should be in provisioning order")
    };
    assert!(position("SharedTopic") < position(&consumer_name));
    assert!(position(&producer_name) < position(&consumer_name));
}

#[test]
fn decorator_collision_with_existing_resource_fails() {
    let mut first = FunctionDescriptor::register("handlers::first", RoleDefinition::new());
    first.add_decorator(CompanionResourceDecorator::new(
        "SharedName",
        Resource::s3_bucket(),
    ));
    let mut second = FunctionDescriptor::register("handlers::second", RoleDefinition::new());
    second.add_decorator(CompanionResourceDecorator::new(
        "SharedName",
        Resource::sns_topic(),
    ));
    let second_name = second.logical_name().to_string();

    let mut builder = TopologyBuilder::new(TopologyConfig::named("Collision"));
    builder.add(first).add(second);
    let error = builder.build().expect_err("build should fail");
    assert_eq!(
        error,
        TopologyError::DuplicateResourceName {
            name: "SharedName".to_string(),
            inserted_by: second_name,
        }
    );
}

#[test]
fn dependency_cycle_is_fatal() {
    let mut first = FunctionDescriptor::register("handlers::cycle_a", RoleDefinition::new());
    let mut second = FunctionDescriptor::register("handlers::cycle_b", RoleDefinition::new());
    let first_name = first.logical_name().to_string();
    let second_name = second.logical_name().to_string();
    first.add_dependency(&second_name);
    second.add_dependency(&first_name);

    let mut builder = TopologyBuilder::new(TopologyConfig::named("Cycle"));
    builder.add(first).add(second);
    let error = builder.build().expect_err("build should fail");
    match error {
        TopologyError::DependencyCycle { members } => {
            assert!(members.contains(&first_name));
            assert!(members.contains(&second_name));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn ses_permission_injects_message_body_bucket_and_orders_rules() {
    let storage = MessageBodyStorage::allocate("Special");
    let bucket_name = storage.logical_name().to_string();

    let mut descriptor =
        FunctionDescriptor::register("handlers::echo_ses_event", RoleDefinition::new());
    descriptor.role = RoleDefinition::new().with_privilege(IamPrivilege::new(
        &["s3:GetObject", "s3:HeadObject"],
        storage.bucket_all_keys_arn(),
    ));
    descriptor
        .add_permission(Permission::Ses {
            source: ResourceRef::literal("*"),
            invocation_type: InvocationType::Event,
            receipt_rules: vec![
                ReceiptRule::new("Special", &["somebody_special@example.com"]),
                ReceiptRule::new("Default", &[]),
            ],
            message_body_storage: Some(storage),
        })
        .set_options(FunctionOptions {
            description: None,
            memory_mb: Some(128),
            timeout_seconds: Some(10),
        });
    let function_name = descriptor.logical_name().to_string();

    let mut builder = TopologyBuilder::new(TopologyConfig::named("Mail"));
    builder.add(descriptor);
    let topology = builder.build().expect("build should succeed");

    let bucket = topology
        .graph
        .get(&bucket_name)
        .expect("message body bucket should be injected");
    assert_eq!(bucket.resource_type, S3_BUCKET_RESOURCE_TYPE);
    assert!(topology.graph.has_edge(&function_name, &bucket_name));

    let function = topology
        .function(&function_name)
        .expect("function should be resolved");
    assert_eq!(
        function.invoke_grants[0].event_type_filters,
        vec!["Special", "Default"]
    );
    assert_eq!(
        function.invoke_grants[0].invocation_type,
        Some(InvocationType::Event)
    );
    assert_eq!(
        function.privileges[0].resource,
        format!("arn:aws:s3:::{bucket_name}/*")
    );
    assert_eq!(function.timeout_seconds, 10);
}

#[test]
fn decorator_edge_to_missing_resource_fails_synthesis() {
    let mut descriptor =
        FunctionDescriptor::register("handlers::edge_only", RoleDefinition::new());
    descriptor.add_decorator(|_graph: &ResourceGraph, self_name: &str| {
        let mut output = DecoratorOutput::new();
        output.edges.push(Edge::new(self_name, "GhostResource"));
        Ok::<_, TopologyError>(output)
    });
    let function_name = descriptor.logical_name().to_string();

    let mut builder = TopologyBuilder::new(TopologyConfig::named("DanglingEdge"));
    builder.add(descriptor);
    let error = builder.build().expect_err("build should fail");
    assert_eq!(
        error,
        TopologyError::DanglingDependency {
            function: function_name,
            dependency: "GhostResource".to_string(),
        }
    );
}

#[test]
fn later_decorator_sees_earlier_insertions() {
    let mut producer = FunctionDescriptor::register("handlers::producer", RoleDefinition::new());
    producer.add_decorator(CompanionResourceDecorator::new(
        "UpstreamBucket",
        Resource::s3_bucket(),
    ));
    let producer_name = producer.logical_name().to_string();

    let mut consumer = FunctionDescriptor::register("handlers::consumer", RoleDefinition::new());
    consumer.add_dependency(&producer_name);
    consumer.add_decorator(|graph: &ResourceGraph, self_name: &str| {
        if !graph.contains("UpstreamBucket") {
            return Err(TopologyError::DanglingDependency {
                function: self_name.to_string(),
                dependency: "UpstreamBucket".to_string(),
            });
        }
        Ok(DecoratorOutput::new().with_companion(self_name, "DownstreamTopic", Resource::sns_topic()))
    });

    let mut builder = TopologyBuilder::new(TopologyConfig::named("Sequenced"));
    builder.add(consumer).add(producer);
    let topology = builder.build().expect("build should succeed");
    assert!(topology.graph.contains("DownstreamTopic"));
}
