use serde_json::{json, Value};
use topo_core::graph::S3_BUCKET_RESOURCE_TYPE;

use crate::adapters::discovery::DiscoverySource;
use crate::adapters::object_store::MessageBodyStore;
use crate::events::MailReceiptEvent;
use crate::handlers::{HandlerError, RequestContext};

/// Mail-receipt flow: the message body bucket was generated at deploy
/// time, so its identity comes from discovery, not from the handler's
/// own declarations. The snapshot is fetched once per call; lookup is by
/// bucket type and fails loudly on ambiguity instead of guessing.
pub fn handle_mail_receipt_event(
    event: Value,
    context: &RequestContext,
    discovery: &dyn DiscoverySource,
    store: &dyn MessageBodyStore,
) -> Result<MailReceiptEvent, HandlerError> {
    let event: MailReceiptEvent = serde_json::from_value(event)
        .map_err(|error| HandlerError::decode(format!("malformed mail receipt: {error}")))?;

    let info = discovery
        .fetch()
        .map_err(HandlerError::configuration)?;
    let bucket = info
        .lookup_one(S3_BUCKET_RESOURCE_TYPE)
        .map_err(HandlerError::configuration)?
        .ok_or_else(|| {
            HandlerError::configuration("no message body bucket in the discovery record")
        })?;
    let bucket_name = bucket.reference().unwrap_or(&bucket.logical_name);

    for record in &event.records {
        log_ses_info(
            "mail_received",
            context,
            json!({
                "source": record.ses.mail.source,
                "message_id": record.ses.mail.message_id,
                "bucket": bucket_name,
            }),
        );

        match store.head_object(bucket_name, &record.ses.mail.message_id) {
            Ok(Some(metadata)) => {
                log_ses_info(
                    "message_body_metadata",
                    context,
                    json!({
                        "message_id": record.ses.mail.message_id,
                        "content_length": metadata.content_length,
                        "content_type": metadata.content_type,
                        "etag": metadata.etag,
                    }),
                );
            }
            Ok(None) => {
                log_ses_error(
                    "message_body_missing",
                    context,
                    json!({
                        "message_id": record.ses.mail.message_id,
                        "bucket": bucket_name,
                    }),
                );
            }
            Err(error) => {
                log_ses_error(
                    "message_body_fetch_failed",
                    context,
                    json!({
                        "message_id": record.ses.mail.message_id,
                        "bucket": bucket_name,
                        "error": error,
                    }),
                );
                return Err(HandlerError::upstream(format!(
                    "head object failed for message '{}': {error}",
                    record.ses.mail.message_id
                )));
            }
        }
    }
    Ok(event)
}

fn log_ses_info(event: &str, context: &RequestContext, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "ses_handler",
            "event": event,
            "request_id": context.request_id,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_ses_error(event: &str, context: &RequestContext, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "ses_handler",
            "level": "error",
            "event": event,
            "request_id": context.request_id,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
