//! Message Lambda: request parsing, response building, and wiring of the
//! pipeline's collaborators from configuration.

pub mod handler;
pub mod helpers;
pub mod parsing;

use std::sync::Arc;
use tracing::info;

use crate::ai::{HttpClassifier, OpenAiCompleter};
use crate::core::config::{AppConfig, MessagingConfig, MessagingMode};
use crate::errors::RelayError;
use crate::escalation::{
    DirectDispatcher, EscalationDispatcher, EscalationNotifier, SqsDispatcher,
};
use crate::messaging::{LogMessenger, Messenger, TwilioMessenger};
use crate::pipeline::{InboundPipeline, PipelineSettings};
use crate::store::LibSqlStore;

// Re-export the main handler for convenience
pub use handler::handler;

/// Picks the SMS transport once per cold start.
pub fn build_messenger(config: &MessagingConfig) -> Result<Arc<dyn Messenger>, RelayError> {
    match config.mode {
        MessagingMode::Mock => {
            info!("Using mock messenger");
            Ok(Arc::new(LogMessenger::new(config.twilio_phone_number.clone())))
        }
        MessagingMode::Twilio => {
            let (Some(sid), Some(token)) = (&config.twilio_account_sid, &config.twilio_auth_token)
            else {
                return Err(RelayError::ConfigError(
                    "Twilio credentials are required unless MESSAGING_MODE=mock".to_string(),
                ));
            };
            let mut messenger =
                TwilioMessenger::new(sid.clone(), token.clone(), config.twilio_phone_number.clone())?;
            if let Some(base) = &config.twilio_api_base {
                messenger = messenger.with_base_url(base.clone());
            }
            Ok(Arc::new(messenger))
        }
    }
}

/// Builds the pipeline and all its collaborators from configuration.
pub async fn build_pipeline(config: &AppConfig) -> Result<InboundPipeline, RelayError> {
    let messenger = build_messenger(&config.messaging)?;

    let completer = OpenAiCompleter::new(
        config.openai_api_key.clone(),
        config.openai_org_id.clone(),
        config.openai_api_base.clone(),
        config.openai_model.clone(),
        config.openai_max_tokens,
        config.openai_temperature,
    )?;

    let dispatcher: Arc<dyn EscalationDispatcher> = match &config.escalation_queue_url {
        Some(queue_url) => {
            info!("Escalations go through SQS");
            Arc::new(SqsDispatcher::from_env(queue_url.clone()).await)
        }
        None => Arc::new(DirectDispatcher::new(EscalationNotifier::new(
            messenger.clone(),
            config.messaging.manager_phone_number.clone(),
        ))),
    };

    let mut settings = PipelineSettings::new(config.messaging.manager_phone_number.clone());
    if let Some(prompt) = &config.system_prompt {
        settings = settings.with_instructions(prompt.clone());
    }

    let mut pipeline = InboundPipeline::new(settings, messenger, Arc::new(completer), dispatcher);

    if let Some(endpoint) = &config.classifier_endpoint {
        info!("Classifier enabled");
        pipeline = pipeline.with_classifier(Arc::new(HttpClassifier::new(
            endpoint.clone(),
            config.classifier_api_key.clone(),
        )?));
    }

    if let Some(url) = &config.database_url {
        let store = LibSqlStore::open(url, config.database_auth_token.clone()).await?;
        pipeline = pipeline.with_store(Arc::new(store));
    }

    Ok(pipeline)
}
