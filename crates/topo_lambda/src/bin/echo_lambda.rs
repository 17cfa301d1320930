use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use topo_lambda::handlers::echo::{api_gateway_response, handle_echo_event, ApiGatewayResponse};
use topo_lambda::handlers::RequestContext;

async fn handle_request(event: LambdaEvent<Value>) -> Result<ApiGatewayResponse, Error> {
    let context = RequestContext::new(event.context.request_id.clone());
    Ok(api_gateway_response(handle_echo_event(
        event.payload,
        &context,
    )))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
