//! Escalate Lambda handler.
//!
//! Accepts an API Gateway proxy event, an SQS event fed by the Message
//! Lambda, or a bare escalation payload from a direct invocation.

use lambda_runtime::{Error, LambdaEvent};
use serde_json::{Value, json};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::EscalationNotifier;
use crate::api::{helpers, parsing};
use crate::errors::RelayError;

pub const SUCCESS_MESSAGE: &str = "Escalation sent successfully";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

pub use self::function_handler as handler;

pub async fn function_handler(
    notifier: &EscalationNotifier,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    Ok(handle_event(notifier, &event.payload).await)
}

#[tracing::instrument(level = "info", skip_all, fields(correlation_id = %Uuid::new_v4()))]
pub async fn handle_event(notifier: &EscalationNotifier, payload: &Value) -> Value {
    if let Some(records) = payload.get("Records").and_then(Value::as_array) {
        return handle_sqs_records(notifier, records).await;
    }

    let result = match payload.get("body") {
        Some(_) => parsing::extract_body(payload).and_then(|b| parsing::parse_json_body(&b)),
        None => Ok(payload.clone()),
    };

    let outcome = match result {
        Ok(raw) => notifier.notify_raw(&raw).await.map(|_| ()),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => helpers::ok_message_at(SUCCESS_MESSAGE),
        Err(e) => {
            error!("Escalation error: {}", e);
            error_response(&e)
        }
    }
}

/// 400 with the violated rule for caller mistakes, generic 500 otherwise.
#[must_use]
pub fn error_response(e: &RelayError) -> Value {
    match e {
        RelayError::Validation(_) | RelayError::ParseError(_) => {
            helpers::err_response_at(400, &e.to_string())
        }
        _ => helpers::err_response_at(500, INTERNAL_ERROR_MESSAGE),
    }
}

async fn handle_sqs_records(notifier: &EscalationNotifier, records: &[Value]) -> Value {
    info!("Processing {} SQS records", records.len());

    let mut sent = 0usize;
    let mut failed = 0usize;

    for record in records {
        let Some(body) = record.get("body").and_then(Value::as_str) else {
            warn!("SQS record has no body, skipping");
            failed += 1;
            continue;
        };

        let outcome = match serde_json::from_str::<Value>(body) {
            Ok(raw) => notifier.notify_raw(&raw).await.map(|_| ()),
            Err(e) => Err(RelayError::from(e)),
        };

        match outcome {
            Ok(()) => sent += 1,
            Err(e) => {
                // Continue with the rest of the batch
                error!("Failed to process escalation record: {}", e);
                failed += 1;
            }
        }
    }

    json!({ "sent": sent, "failed": failed })
}
