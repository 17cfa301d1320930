use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use topo_lambda::adapters::discovery::{CachedDiscoverySource, EnvDiscoverySource};
use topo_lambda::adapters::object_store::{MessageBodyStore, ObjectMetadata};
use topo_lambda::events::MailReceiptEvent;
use topo_lambda::handlers::ses::handle_mail_receipt_event;
use topo_lambda::handlers::RequestContext;

struct AwsMessageBodyStore {
    s3_client: aws_sdk_s3::Client,
}

impl MessageBodyStore for AwsMessageBodyStore {
    fn head_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectMetadata>, String> {
        let client = self.s3_client.clone();
        let bucket = bucket.to_string();
        let key = key.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                match client.head_object().bucket(bucket).key(key).send().await {
                    Ok(output) => Ok(Some(ObjectMetadata {
                        content_length: output.content_length(),
                        content_type: output.content_type().map(str::to_string),
                        etag: output.e_tag().map(str::to_string),
                    })),
                    Err(error) => {
                        let service_error = error.into_service_error();
                        if service_error.is_not_found() {
                            Ok(None)
                        } else {
                            Err(format!("head object failed: {service_error}"))
                        }
                    }
                }
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<MailReceiptEvent, Error> {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = AwsMessageBodyStore {
        s3_client: aws_sdk_s3::Client::new(&config),
    };
    let discovery = CachedDiscoverySource::new(EnvDiscoverySource::new());
    let context = RequestContext::new(event.context.request_id.clone());

    let response = handle_mail_receipt_event(event.payload, &context, &discovery, &store)?;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
