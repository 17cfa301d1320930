//! Assembles the full sample application topology and prints the
//! synthesized deployment description as JSON.

use topo_core::decorator::CompanionResourceDecorator;
use topo_core::event_source::{EventSourceMapping, StartingPosition};
use topo_core::function::{FunctionDescriptor, FunctionOptions};
use topo_core::graph::{DeletionPolicy, Resource};
use topo_core::permission::{
    CloudWatchEventsRule, CloudWatchLogsFilter, InvocationType, MessageBodyStorage, Permission,
    ReceiptRule,
};
use topo_core::privilege::{IamPrivilege, RoleDefinition};
use topo_core::reference::ResourceRef;
use topo_core::topology::{TopologyBuilder, TopologyConfig};

const S3_BUCKET: &str = "arn:aws:s3:::MyS3Bucket";
const SNS_TOPIC: &str = "arn:aws:sns:us-west-2:123412341234:mySNSTopic";
const DYNAMO_STREAM: &str =
    "arn:aws:dynamodb:us-west-2:123412341234:table/myTableName/stream/2015-10-22T15:05:13.779";
const KINESIS_STREAM: &str = "arn:aws:kinesis:us-west-2:123412341234:stream/kinesisTestStream";

fn s3_function() -> FunctionDescriptor {
    let mut descriptor =
        FunctionDescriptor::register("handlers::echo_s3_event", RoleDefinition::new());
    descriptor.add_permission(Permission::S3 {
        source: ResourceRef::literal(S3_BUCKET),
        events: vec![
            "s3:ObjectCreated:*".to_string(),
            "s3:ObjectRemoved:*".to_string(),
        ],
    });
    descriptor
}

fn dynamic_s3_function() -> FunctionDescriptor {
    let bucket_name = "S3DynamicBucket";
    let mut descriptor = FunctionDescriptor::register(
        "handlers::echo_dynamic_bucket_event",
        RoleDefinition::new().with_privilege(IamPrivilege::new(
            &["s3:GetObject", "s3:HeadObject"],
            ResourceRef::deferred(bucket_name),
        )),
    );
    descriptor
        .add_permission(Permission::S3 {
            source: ResourceRef::deferred(bucket_name),
            events: vec![
                "s3:ObjectCreated:*".to_string(),
                "s3:ObjectRemoved:*".to_string(),
            ],
        })
        .add_dependency(bucket_name)
        .add_decorator(CompanionResourceDecorator::new(
            bucket_name,
            Resource::s3_bucket()
                .with_deletion_policy(DeletionPolicy::Delete)
                .with_discovery_alias("dynamic-bucket"),
        ));
    descriptor
}

fn sns_function() -> FunctionDescriptor {
    let mut descriptor =
        FunctionDescriptor::register("handlers::echo_sns_event", RoleDefinition::new());
    descriptor.add_permission(Permission::Sns {
        source: ResourceRef::literal(SNS_TOPIC),
    });
    descriptor
}

fn dynamic_sns_function() -> FunctionDescriptor {
    let topic_name = "SNSDynamicTopic";
    let mut descriptor =
        FunctionDescriptor::register("handlers::echo_dynamic_sns_event", RoleDefinition::new());
    descriptor
        .add_permission(Permission::Sns {
            source: ResourceRef::deferred(topic_name),
        })
        .add_decorator(CompanionResourceDecorator::new(
            topic_name,
            Resource::sns_topic()
                .with_property("DisplayName", serde_json::json!("Application SNS topic")),
        ))
        .add_dependency(topic_name);
    descriptor
}

fn dynamo_function() -> FunctionDescriptor {
    let mut descriptor =
        FunctionDescriptor::register("handlers::echo_dynamo_event", RoleDefinition::new());
    descriptor.add_event_source_mapping(EventSourceMapping::new(
        ResourceRef::literal(DYNAMO_STREAM),
        StartingPosition::TrimHorizon,
        10,
    ));
    descriptor
}

fn kinesis_function() -> FunctionDescriptor {
    let mut descriptor =
        FunctionDescriptor::register("handlers::echo_kinesis_event", RoleDefinition::new());
    descriptor.add_event_source_mapping(EventSourceMapping::new(
        ResourceRef::literal(KINESIS_STREAM),
        StartingPosition::TrimHorizon,
        100,
    ));
    descriptor
}

fn ses_function() -> FunctionDescriptor {
    let storage = MessageBodyStorage::allocate("Special");
    let mut descriptor = FunctionDescriptor::register(
        "handlers::echo_ses_event",
        RoleDefinition::new().with_privilege(IamPrivilege::new(
            &["s3:GetObject", "s3:HeadObject"],
            storage.bucket_all_keys_arn(),
        )),
    );
    descriptor
        .set_options(FunctionOptions {
            description: None,
            memory_mb: Some(128),
            timeout_seconds: Some(10),
        })
        .add_permission(Permission::Ses {
            source: ResourceRef::literal("*"),
            invocation_type: InvocationType::Event,
            receipt_rules: vec![
                ReceiptRule::new("Special", &["somebody_special@example.com"]),
                ReceiptRule::new("Default", &[]),
            ],
            message_body_storage: Some(storage),
        });
    descriptor
}

fn cloudwatch_events_function() -> FunctionDescriptor {
    let mut descriptor =
        FunctionDescriptor::register("handlers::echo_cloudwatch_event", RoleDefinition::new());
    descriptor.add_permission(Permission::CloudWatchEvents {
        rules: vec![
            CloudWatchEventsRule::scheduled("Rate5Mins", "rate(5 minutes)"),
            CloudWatchEventsRule::patterned(
                "EC2Activity",
                serde_json::json!({
                    "source": ["aws.ec2"],
                    "detail-type": ["EC2 Instance state change"],
                }),
            ),
        ],
    });
    descriptor
}

fn cloudwatch_logs_function() -> FunctionDescriptor {
    let mut descriptor =
        FunctionDescriptor::register("handlers::echo_cloudwatch_logs_event", RoleDefinition::new());
    descriptor.add_permission(Permission::CloudWatchLogs {
        filters: vec![CloudWatchLogsFilter {
            name: "MyFilter".to_string(),
            log_group_name: "/application/testing".to_string(),
            filter_pattern: String::new(),
        }],
    });
    descriptor
}

fn main() {
    let mut builder = TopologyBuilder::new(TopologyConfig::named("SampleApplication"));
    builder
        .add(s3_function())
        .add(dynamic_s3_function())
        .add(sns_function())
        .add(dynamic_sns_function())
        .add(dynamo_function())
        .add(kinesis_function())
        .add(ses_function())
        .add(cloudwatch_events_function())
        .add(cloudwatch_logs_function());

    match builder.build() {
        Ok(topology) => {
            let rendered =
                serde_json::to_string_pretty(&topology).expect("topology should serialize");
            println!("{rendered}");
        }
        Err(error) => {
            eprintln!("synthesis failed: {error}");
            std::process::exit(1);
        }
    }
}
