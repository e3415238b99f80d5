use crate::event::{InboundEvent, InvocationResult};
use crate::handler::ImageIngestHandler;
use crate::storage::ObjectStore;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{info_span, Instrument};

/// Lambda entry point. Always returns `Ok`; failures are encoded in the
/// status code of the result.
pub async fn function_handler<S: ObjectStore>(
    event: LambdaEvent<Value>,
    handler: &ImageIngestHandler<S>,
) -> Result<InvocationResult, Error> {
    let (payload, context) = event.into_parts();
    let span = info_span!("invocation", request_id = %context.request_id);

    let result = handler
        .handle(&InboundEvent::from(payload))
        .instrument(span)
        .await;

    Ok(result)
}
