use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TopologyError;
use crate::graph::{DeletionPolicy, Resource};
use crate::names;
use crate::reference::{RefFormat, ResourceRef};

pub const INVOKE_ACTION: &str = "lambda:InvokeFunction";

pub const S3_PRINCIPAL: &str = "s3.amazonaws.com";
pub const SNS_PRINCIPAL: &str = "sns.amazonaws.com";
pub const SES_PRINCIPAL: &str = "ses.amazonaws.com";
pub const CLOUDWATCH_EVENTS_PRINCIPAL: &str = "events.amazonaws.com";
pub const CLOUDWATCH_LOGS_PRINCIPAL: &str = "logs.amazonaws.com";

/// TLS requirement for mail delivered to a receipt rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TlsPolicy {
    #[default]
    Optional,
    Require,
}

/// How the mail service invokes the function for a matched receipt rule.
/// Asynchronous delivery is the default; `RequestResponse` blocks rule
/// processing on the handler's result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationType {
    #[default]
    Event,
    RequestResponse,
}

impl InvocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "Event",
            Self::RequestResponse => "RequestResponse",
        }
    }
}

/// One mail-routing rule. Insertion order is semantically significant to
/// the downstream routing policy and must survive synthesis unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRule {
    pub name: String,
    pub recipients: Vec<String>,
    pub tls_policy: TlsPolicy,
}

impl ReceiptRule {
    pub fn new(name: impl Into<String>, recipients: &[&str]) -> Self {
        Self {
            name: name.into(),
            recipients: recipients.iter().map(|value| value.to_string()).collect(),
            tls_policy: TlsPolicy::default(),
        }
    }
}

/// Handle to a to-be-created bucket that stores raw message bodies for an
/// SES permission. The bucket does not exist until synthesis completes,
/// so both ARN accessors hand back deferred references suitable for
/// least-privilege read statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBodyStorage {
    bucket_logical_name: String,
    deletion_policy: DeletionPolicy,
}

impl MessageBodyStorage {
    /// Allocates storage under a derived bucket name namespaced by `base`.
    pub fn allocate(base: &str) -> Self {
        Self {
            bucket_logical_name: names::resource_logical_name(&format!("{base}MessageBodyBucket")),
            deletion_policy: DeletionPolicy::Retain,
        }
    }

    /// Message bodies are data; deletion stays opt-in.
    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = policy;
        self
    }

    pub fn logical_name(&self) -> &str {
        &self.bucket_logical_name
    }

    pub fn bucket_arn(&self) -> ResourceRef {
        ResourceRef::deferred_with_format(&self.bucket_logical_name, RefFormat::BucketArn)
    }

    pub fn bucket_all_keys_arn(&self) -> ResourceRef {
        ResourceRef::deferred_with_format(&self.bucket_logical_name, RefFormat::BucketAllKeysArn)
    }

    /// The bucket definition injected into the graph during synthesis.
    pub(crate) fn bucket_resource(&self) -> Resource {
        Resource::s3_bucket().with_deletion_policy(self.deletion_policy)
    }
}

/// A named scheduled or pattern-matched event rule. A rule must carry a
/// schedule expression, an event pattern, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudWatchEventsRule {
    pub name: String,
    pub schedule_expression: Option<String>,
    pub event_pattern: Option<Value>,
}

impl CloudWatchEventsRule {
    pub fn scheduled(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schedule_expression: Some(expression.into()),
            event_pattern: None,
        }
    }

    pub fn patterned(name: impl Into<String>, pattern: Value) -> Self {
        Self {
            name: name.into(),
            schedule_expression: None,
            event_pattern: Some(pattern),
        }
    }
}

/// A named log-subscription filter against an existing log group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudWatchLogsFilter {
    pub name: String,
    pub log_group_name: String,
    pub filter_pattern: String,
}

/// How a push-style event source is allowed to invoke a function. Pull
/// bindings (stream polling) are event source mappings, never permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Permission {
    S3 {
        source: ResourceRef,
        events: Vec<String>,
    },
    Sns {
        source: ResourceRef,
    },
    Ses {
        source: ResourceRef,
        invocation_type: InvocationType,
        receipt_rules: Vec<ReceiptRule>,
        message_body_storage: Option<MessageBodyStorage>,
    },
    CloudWatchEvents {
        rules: Vec<CloudWatchEventsRule>,
    },
    CloudWatchLogs {
        filters: Vec<CloudWatchLogsFilter>,
    },
    Generic {
        principal: String,
        source: ResourceRef,
    },
}

/// The structured grant handed to the deploy engine for a push binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeGrant {
    pub principal: String,
    pub action: String,
    pub source_arn: ResourceRef,
    pub event_type_filters: Vec<String>,
    /// Set only for mail-receipt bindings.
    pub invocation_type: Option<InvocationType>,
}

impl Permission {
    pub fn validate(&self, function: &str) -> Result<(), TopologyError> {
        let invalid = |message: String| TopologyError::InvalidPermissionConfiguration {
            function: function.to_string(),
            message,
        };

        match self {
            Self::S3 { events, .. } => {
                if events.is_empty() {
                    return Err(invalid(
                        "S3 permission requires at least one event type filter".to_string(),
                    ));
                }
                if events.iter().any(|event| event.trim().is_empty()) {
                    return Err(invalid(
                        "S3 event type filters must be non-empty".to_string(),
                    ));
                }
            }
            Self::Sns { .. } => {}
            Self::Ses { receipt_rules, .. } => {
                for (index, rule) in receipt_rules.iter().enumerate() {
                    if rule.name.trim().is_empty() {
                        return Err(invalid("receipt rule names must be non-empty".to_string()));
                    }
                    if receipt_rules[..index]
                        .iter()
                        .any(|earlier| earlier.name == rule.name)
                    {
                        return Err(invalid(format!(
                            "duplicate receipt rule name '{}'",
                            rule.name
                        )));
                    }
                }
            }
            Self::CloudWatchEvents { rules } => {
                if rules.is_empty() {
                    return Err(invalid(
                        "CloudWatch events permission requires at least one rule".to_string(),
                    ));
                }
                for (index, rule) in rules.iter().enumerate() {
                    if rule.name.trim().is_empty() {
                        return Err(invalid("event rule names must be non-empty".to_string()));
                    }
                    if rules[..index].iter().any(|earlier| earlier.name == rule.name) {
                        return Err(invalid(format!("duplicate event rule name '{}'", rule.name)));
                    }
                    if rule.schedule_expression.is_none() && rule.event_pattern.is_none() {
                        return Err(invalid(format!(
                            "event rule '{}' needs a schedule expression or an event pattern",
                            rule.name
                        )));
                    }
                }
            }
            Self::CloudWatchLogs { filters } => {
                if filters.is_empty() {
                    return Err(invalid(
                        "CloudWatch logs permission requires at least one filter".to_string(),
                    ));
                }
                for (index, filter) in filters.iter().enumerate() {
                    if filter.name.trim().is_empty() {
                        return Err(invalid("log filter names must be non-empty".to_string()));
                    }
                    if filter.log_group_name.trim().is_empty() {
                        return Err(invalid(format!(
                            "log filter '{}' needs a log group name",
                            filter.name
                        )));
                    }
                    if filters[..index]
                        .iter()
                        .any(|earlier| earlier.name == filter.name)
                    {
                        return Err(invalid(format!(
                            "duplicate log filter name '{}'",
                            filter.name
                        )));
                    }
                }
            }
            Self::Generic { principal, .. } => {
                if principal.trim().is_empty() {
                    return Err(invalid(
                        "generic permission requires a principal".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Renders the invoke grant for this push binding. Validation runs
    /// first so a grant is never emitted from a malformed declaration.
    pub fn invoke_grant(&self, function: &str) -> Result<InvokeGrant, TopologyError> {
        self.validate(function)?;
        let grant = match self {
            Self::S3 { source, events } => InvokeGrant {
                principal: S3_PRINCIPAL.to_string(),
                action: INVOKE_ACTION.to_string(),
                source_arn: source.clone(),
                event_type_filters: events.clone(),
                invocation_type: None,
            },
            Self::Sns { source } => InvokeGrant {
                principal: SNS_PRINCIPAL.to_string(),
                action: INVOKE_ACTION.to_string(),
                source_arn: source.clone(),
                event_type_filters: Vec::new(),
                invocation_type: None,
            },
            Self::Ses {
                source,
                invocation_type,
                receipt_rules,
                ..
            } => InvokeGrant {
                principal: SES_PRINCIPAL.to_string(),
                action: INVOKE_ACTION.to_string(),
                source_arn: source.clone(),
                event_type_filters: receipt_rules.iter().map(|rule| rule.name.clone()).collect(),
                invocation_type: Some(*invocation_type),
            },
            Self::CloudWatchEvents { rules } => InvokeGrant {
                principal: CLOUDWATCH_EVENTS_PRINCIPAL.to_string(),
                action: INVOKE_ACTION.to_string(),
                source_arn: ResourceRef::literal("*"),
                event_type_filters: rules.iter().map(|rule| rule.name.clone()).collect(),
                invocation_type: None,
            },
            Self::CloudWatchLogs { filters } => InvokeGrant {
                principal: CLOUDWATCH_LOGS_PRINCIPAL.to_string(),
                action: INVOKE_ACTION.to_string(),
                source_arn: ResourceRef::literal("*"),
                event_type_filters: filters.iter().map(|filter| filter.name.clone()).collect(),
                invocation_type: None,
            },
            Self::Generic { principal, source } => InvokeGrant {
                principal: principal.clone(),
                action: INVOKE_ACTION.to_string(),
                source_arn: source.clone(),
                event_type_filters: Vec::new(),
                invocation_type: None,
            },
        };
        Ok(grant)
    }

    /// The message body storage attached to an SES permission, if any.
    pub fn message_body_storage(&self) -> Option<&MessageBodyStorage> {
        match self {
            Self::Ses {
                message_body_storage,
                ..
            } => message_body_storage.as_ref(),
            _ => None,
        }
    }

    /// Logical names this permission references through deferred values.
    pub fn deferred_targets(&self) -> Vec<&str> {
        let source = match self {
            Self::S3 { source, .. }
            | Self::Sns { source }
            | Self::Ses { source, .. }
            | Self::Generic { source, .. } => source.deferred_target(),
            Self::CloudWatchEvents { .. } | Self::CloudWatchLogs { .. } => None,
        };
        source.into_iter().collect()
    }
}
