/// SMS Relay - serverless handlers that answer customer SMS with an AI model
/// and escalate what the model cannot answer to a human manager.
///
/// This crate implements a two-Lambda architecture:
/// 1. A Message Lambda that receives inbound SMS webhooks, asks the completion
///    service for a reply (optionally pre-classifying the message), persists the
///    exchange and either answers the customer or escalates
/// 2. An Escalate Lambda that validates escalation payloads and alerts the manager
///
/// Manager replies arrive through the Message Lambda, are forwarded to the
/// customer and stored as learned Q&A pairs that feed future prompts.
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda for serverless execution
/// - SQS for handing escalations from the Message Lambda to the Escalate Lambda
/// - Twilio's REST API (over reqwest) for SMS
/// - openai-api-rs for ChatGPT integration
/// - libsql for the conversation store
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sms_relay::core::models::InboundMessage;
/// use sms_relay::escalation::{DirectDispatcher, EscalationNotifier};
/// use sms_relay::messaging::LogMessenger;
/// use sms_relay::pipeline::{InboundPipeline, PipelineSettings};
/// use sms_relay::ai::OpenAiCompleter;
/// use sms_relay::store::MemoryStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     sms_relay::setup_logging();
///
///     let messenger = Arc::new(LogMessenger::new("+15550000000".to_string()));
///     let notifier = EscalationNotifier::new(messenger.clone(), "+15559999999".to_string());
///     let completer = OpenAiCompleter::new(
///         "sk-dummy".to_string(),
///         None,
///         None,
///         "gpt-3.5-turbo".to_string(),
///         160,
///         0.5,
///     )?;
///
///     let pipeline = InboundPipeline::new(
///         PipelineSettings::new("+15559999999".to_string()),
///         messenger,
///         Arc::new(completer),
///         Arc::new(DirectDispatcher::new(notifier)),
///     )
///     .with_store(Arc::new(MemoryStore::new()));
///
///     let outcome = pipeline
///         .handle(InboundMessage::new("+15551234567", "What are your hours?"))
///         .await?;
///     println!("{outcome:?}");
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod api;
pub mod core;
pub mod errors;
pub mod escalation;
pub mod messaging;
pub mod pipeline;
pub mod prompt;
pub mod store;

pub use errors::{RelayError, ValidationRule};

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. The level comes from `RUST_LOG` and defaults
/// to `info`. Calling it more than once is harmless.
///
/// # Example
///
/// ```
/// // Initialize structured logging at the start of your Lambda handler
/// sms_relay::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
