//! LLM (`OpenAI`) completion client
//!
//! Encapsulates the chat completion call that drafts SMS replies and decides
//! whether the model asked for a human.

use async_trait::async_trait;
use openai_api_rs::v1::api::OpenAIClient;
use openai_api_rs::v1::chat_completion::{
    ChatCompletionMessage, ChatCompletionRequest, Content, MessageRole,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::RelayError;
use crate::prompt::is_escalation_sentinel;

/// Prompt pieces for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_message: String,
}

/// A completion together with the model's escalation decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub escalate: bool,
}

impl Completion {
    /// Wraps raw model output, deriving `escalate` from the sentinel phrase.
    #[must_use]
    pub fn from_model_text(raw: &str) -> Self {
        let text = raw.trim().to_string();
        let escalate = is_escalation_sentinel(&text);
        Self { text, escalate }
    }
}

#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, RelayError>;
}

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// Chat completion client backed by `openai-api-rs`.
pub struct OpenAiCompleter {
    // `chat_completion` needs `&mut self`; one call at a time per Lambda instance.
    client: Mutex<OpenAIClient>,
    model_name: String,
    max_tokens: i64,
    temperature: f64,
}

impl OpenAiCompleter {
    pub fn new(
        api_key: String,
        org_id: Option<String>,
        api_base: Option<String>,
        model_name: String,
        max_tokens: i64,
        temperature: f64,
    ) -> Result<Self, RelayError> {
        let mut builder = OpenAIClient::builder().with_api_key(api_key);
        if let Some(org) = org_id {
            builder = builder.with_organization(org);
        }
        if let Some(base) = api_base {
            builder = builder.with_endpoint(base);
        }
        let client = builder.build().map_err(|e| {
            RelayError::OpenAIError(format!("Failed to create OpenAI client: {}", e))
        })?;

        Ok(Self {
            client: Mutex::new(client),
            model_name,
            max_tokens,
            temperature,
        })
    }

    #[must_use]
    pub fn build_messages(request: &CompletionRequest) -> Vec<ChatCompletionMessage> {
        vec![
            ChatCompletionMessage {
                role: MessageRole::system,
                content: Content::Text(request.system_prompt.clone()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
            ChatCompletionMessage {
                role: MessageRole::user,
                content: Content::Text(request.user_message.clone()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
        ]
    }
}

#[async_trait]
impl Completer for OpenAiCompleter {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, RelayError> {
        #[cfg(feature = "debug-logs")]
        info!("Using ChatGPT prompt:\n{}", request.system_prompt);

        info!(
            model = %self.model_name,
            estimated_input_tokens =
                estimate_tokens(&request.system_prompt) + estimate_tokens(&request.user_message),
            "Requesting completion"
        );

        let chat_req =
            ChatCompletionRequest::new(self.model_name.clone(), Self::build_messages(request))
                .max_tokens(self.max_tokens)
                .temperature(self.temperature);

        let result = {
            let mut client = self.client.lock().await;
            client.chat_completion(chat_req).await?
        };

        let text = result
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| RelayError::OpenAIError("No text in completion response".to_string()))?;

        let completion = Completion::from_model_text(&text);
        debug!(escalate = completion.escalate, "Completion received");
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_completion_escalates() {
        let c = Completion::from_model_text("  Let me forward this to a manager.\n");
        assert!(c.escalate);
        assert_eq!(c.text, "Let me forward this to a manager.");
    }

    #[test]
    fn ordinary_completion_does_not_escalate() {
        let c = Completion::from_model_text("We are open daily from 8 to 11.");
        assert!(!c.escalate);
    }

    #[test]
    fn messages_are_system_then_user() {
        let msgs = OpenAiCompleter::build_messages(&CompletionRequest {
            system_prompt: "rules".to_string(),
            user_message: "hi".to_string(),
        });
        assert_eq!(msgs.len(), 2);
        assert!(matches!(msgs[0].role, MessageRole::system));
        assert!(matches!(msgs[1].role, MessageRole::user));
        assert!(matches!(&msgs[1].content, Content::Text(t) if t == "hi"));
    }
}
