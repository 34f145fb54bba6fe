use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;
use tracing::info;

use super::EscalationDispatcher;
use crate::core::models::EscalationPayload;
use crate::errors::RelayError;

/// Queues escalations for the Escalate Lambda, which consumes the queue.
pub struct SqsDispatcher {
    client: SqsClient,
    queue_url: String,
}

impl SqsDispatcher {
    #[must_use]
    pub fn new(client: SqsClient, queue_url: String) -> Self {
        Self { client, queue_url }
    }

    /// Builds the SQS client from the Lambda's ambient AWS configuration.
    pub async fn from_env(queue_url: String) -> Self {
        let shared_config = aws_config::from_env().load().await;
        Self::new(SqsClient::new(&shared_config), queue_url)
    }
}

#[async_trait]
impl EscalationDispatcher for SqsDispatcher {
    async fn dispatch(&self, payload: &EscalationPayload) -> Result<(), RelayError> {
        // The consumer drops payloads that fail these rules
        payload.validate()?;

        let message_body = serde_json::to_string(payload).map_err(|e| {
            RelayError::ParseError(format!("Failed to serialize escalation: {e}"))
        })?;

        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(message_body)
            .send()
            .await
            .map_err(|e| RelayError::AwsError(format!("Failed to send message to SQS: {e}")))?;

        info!(
            from_number = %payload.from_number,
            conversation_id = ?payload.conversation_id,
            "Escalation queued"
        );
        Ok(())
    }
}
