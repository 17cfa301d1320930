//! Normalized inbound event payloads, one family per binding type. The
//! field set is the subset the handlers act on; unknown fields are
//! ignored on decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStoreEvent {
    #[serde(rename = "Records")]
    pub records: Vec<ObjectStoreRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStoreRecord {
    #[serde(rename = "eventSource")]
    pub event_source: String,
    #[serde(rename = "eventName")]
    pub event_name: String,
    pub s3: ObjectStoreEntity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStoreEntity {
    pub bucket: ObjectStoreBucket,
    pub object: ObjectStoreObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStoreBucket {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStoreObject {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicEvent {
    #[serde(rename = "Records")]
    pub records: Vec<TopicRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    #[serde(rename = "Sns")]
    pub sns: TopicMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMessage {
    #[serde(rename = "TopicArn")]
    pub topic_arn: String,
    #[serde(rename = "Message")]
    pub message: String,
}

/// Change-stream and partitioned-log batches share a shape: a list of
/// records the handler passes through opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "Records")]
    pub records: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailReceiptEvent {
    #[serde(rename = "Records")]
    pub records: Vec<MailReceiptRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailReceiptRecord {
    pub ses: MailReceipt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailReceipt {
    pub mail: MailMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailMessage {
    pub source: String,
    #[serde(rename = "messageId")]
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSubscriptionEvent {
    pub awslogs: LogSubscriptionData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSubscriptionData {
    /// Base64-encoded gzip payload, passed through untouched.
    pub data: String,
}
