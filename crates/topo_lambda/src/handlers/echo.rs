use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::events::{LogSubscriptionEvent, ObjectStoreEvent, StreamEvent, TopicEvent};
use crate::handlers::{HandlerError, RequestContext};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Pass-through echo for free-form payloads (scheduled and
/// pattern-matched events arrive as arbitrary JSON objects).
pub fn handle_echo_event(event: Value, context: &RequestContext) -> Result<Value, HandlerError> {
    if !event.is_object() {
        return Err(HandlerError::decode("event payload must be a JSON object"));
    }
    log_echo_info(
        "event_received",
        context,
        json!({"event": event}),
    );
    Ok(event)
}

pub fn handle_object_store_event(
    event: Value,
    context: &RequestContext,
) -> Result<ObjectStoreEvent, HandlerError> {
    let event: ObjectStoreEvent = decode(event)?;
    log_echo_info(
        "event_received",
        context,
        json!({"records": event.records.len()}),
    );
    Ok(event)
}

pub fn handle_topic_event(event: Value, context: &RequestContext) -> Result<TopicEvent, HandlerError> {
    let event: TopicEvent = decode(event)?;
    log_echo_info(
        "event_received",
        context,
        json!({"records": event.records.len()}),
    );
    Ok(event)
}

pub fn handle_stream_event(
    event: Value,
    context: &RequestContext,
) -> Result<StreamEvent, HandlerError> {
    let event: StreamEvent = decode(event)?;
    log_echo_info(
        "event_received",
        context,
        json!({"records": event.records.len()}),
    );
    Ok(event)
}

pub fn handle_log_subscription_event(
    event: Value,
    context: &RequestContext,
) -> Result<LogSubscriptionEvent, HandlerError> {
    let event: LogSubscriptionEvent = decode(event)?;
    log_echo_info("event_received", context, json!({}));
    Ok(event)
}

fn decode<T: serde::de::DeserializeOwned>(event: Value) -> Result<T, HandlerError> {
    serde_json::from_value(event)
        .map_err(|error| HandlerError::decode(format!("malformed event payload: {error}")))
}

/// Wraps a handler outcome for the HTTP-fronted push bindings. Failures
/// surface with their status class; nothing here is process-fatal.
pub fn api_gateway_response(result: Result<impl Serialize, HandlerError>) -> ApiGatewayResponse {
    match result {
        Ok(payload) => match serde_json::to_string(&payload) {
            Ok(body) => ApiGatewayResponse {
                status_code: 200,
                headers: json!({"Content-Type": "application/json"}),
                body,
            },
            Err(error) => ApiGatewayResponse {
                status_code: 500,
                headers: json!({"Content-Type": "application/json"}),
                body: json!({
                    "error": "encode_error",
                    "message": format!("response payload failed to serialize: {error}"),
                })
                .to_string(),
            },
        },
        Err(error) => ApiGatewayResponse {
            status_code: error.status_code(),
            headers: json!({"Content-Type": "application/json"}),
            body: json!({
                "error": match error.kind {
                    crate::handlers::HandlerErrorKind::Decode => "decode_error",
                    crate::handlers::HandlerErrorKind::Configuration => "misconfiguration",
                    crate::handlers::HandlerErrorKind::Upstream => "upstream_error",
                },
                "message": error.message,
            })
            .to_string(),
        },
    }
}

fn log_echo_info(event: &str, context: &RequestContext, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "echo_handler",
            "event": event,
            "request_id": context.request_id,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
