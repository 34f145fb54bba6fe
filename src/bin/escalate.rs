// Lambda entry point for the Escalate function
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;
use sms_relay::api::build_messenger;
use sms_relay::core::config::MessagingConfig;
use sms_relay::escalation::EscalationNotifier;
use sms_relay::escalation::handler::handler;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    sms_relay::setup_logging();

    let config = MessagingConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;

    let messenger = build_messenger(&config).map_err(|e| {
        error!("Failed to initialize messenger: {}", e);
        Error::from(format!("Messenger Initialization Error: {}", e))
    })?;
    let notifier = EscalationNotifier::new(messenger, config.manager_phone_number.clone());
    let notifier = &notifier;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(notifier, event).await
    }))
    .await
}
