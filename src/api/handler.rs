//! Message Lambda handler - parses the SMS webhook, runs the pipeline and
//! turns the outcome into an acknowledgment for the SMS provider.

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use super::{helpers, parsing};
use crate::core::config::ResponseFormat;
use crate::errors::RelayError;
use crate::pipeline::{FAILURE_MESSAGE, InboundPipeline, Outcome};

pub use self::function_handler as handler;

/// Lambda handler for the inbound SMS webhook.
///
/// Never fails for request-level problems: every error becomes the apology
/// acknowledgment with a 500 status.
pub async fn function_handler(
    pipeline: &InboundPipeline,
    format: ResponseFormat,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    Ok(handle_request(pipeline, format, &event.payload).await)
}

/// Event-level entry point, independent of the Lambda runtime types.
#[tracing::instrument(level = "info", skip_all, fields(correlation_id = %Uuid::new_v4()))]
pub async fn handle_request(
    pipeline: &InboundPipeline,
    format: ResponseFormat,
    payload: &Value,
) -> Value {
    #[cfg(feature = "debug-logs")]
    info!("Message Lambda received event: {:?}", payload);

    match process(pipeline, payload).await {
        Ok(outcome) => {
            info!(outcome = outcome.summary(), "Inbound message handled");
            let reply = outcome.reply_to_sender();
            helpers::ack(format, reply.as_deref(), outcome.summary())
        }
        Err(e) => {
            error!("Error: {}", e);
            helpers::failure(format, FAILURE_MESSAGE)
        }
    }
}

async fn process(pipeline: &InboundPipeline, payload: &Value) -> Result<Outcome, RelayError> {
    let body = parsing::extract_body(payload)?;
    let message = parsing::parse_inbound(&body);

    let content_type = payload
        .get("headers")
        .and_then(|h| parsing::get_header_value(h, "Content-Type"))
        .unwrap_or("unknown");
    info!(
        from = %message.from,
        body_len = message.body.len(),
        content_type,
        "Parsed inbound message"
    );

    pipeline.handle(message).await
}
