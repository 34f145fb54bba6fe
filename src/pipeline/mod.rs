//! The inbound message pipeline: routes manager replies, answers customers
//! with the completion service, and escalates what the model cannot answer.

pub mod manager;

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ai::{Classifier, Completer, Completion, CompletionRequest};
use crate::core::models::{EscalationPayload, InboundMessage, NewConversation};
use crate::errors::RelayError;
use crate::escalation::EscalationDispatcher;
use crate::messaging::Messenger;
use crate::prompt::{DEFAULT_INSTRUCTIONS, ESCALATION_SENTINEL, build_system_prompt};
use crate::store::Store;

pub use manager::parse_manager_reply;

/// Notice sent to the manager when there is nothing to reply to.
pub const NO_ACTIVE_ESCALATION: &str = "No active escalation to reply to.";

/// Notice sent to the manager when the reply has nothing to forward.
pub const EMPTY_MANAGER_REPLY: &str = "Your reply was empty, nothing was forwarded.";

/// Stands in for a blank customer message in escalation alerts.
pub const EMPTY_MESSAGE_PLACEHOLDER: &str = "(empty message)";

/// Apology returned to the sender when the pipeline fails.
pub const FAILURE_MESSAGE: &str = "Sorry, I couldn't process your message. Please try again.";

/// Static settings of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub manager_number: String,
    pub instructions: String,
}

impl PipelineSettings {
    #[must_use]
    pub fn new(manager_number: String) -> Self {
        Self {
            manager_number,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }

    #[must_use]
    pub fn with_instructions(mut self, instructions: String) -> Self {
        self.instructions = instructions;
        self
    }
}

/// What a single invocation did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The AI answer was texted to the customer.
    Replied { conversation_id: Option<i64> },
    /// The customer got the sentinel and the manager was alerted.
    Escalated { conversation_id: Option<i64> },
    /// A manager reply was forwarded to the customer and learned.
    ManagerReplyForwarded { customer: String, conversation_id: i64 },
    /// The manager wrote but no escalation is pending.
    NoActiveEscalation,
    /// The manager's reply had no text to forward.
    EmptyManagerReply,
}

impl Outcome {
    /// Text to send back to whoever sent the inbound SMS, if any.
    #[must_use]
    pub fn reply_to_sender(&self) -> Option<String> {
        match self {
            Outcome::Replied { .. } | Outcome::Escalated { .. } => None,
            Outcome::ManagerReplyForwarded { customer, .. } => {
                Some(format!("Reply forwarded to {customer}."))
            }
            Outcome::NoActiveEscalation => Some(NO_ACTIVE_ESCALATION.to_string()),
            Outcome::EmptyManagerReply => Some(EMPTY_MANAGER_REPLY.to_string()),
        }
    }

    /// Short status line for logs and JSON acknowledgments.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        match self {
            Outcome::Replied { .. } => "AI response sent",
            Outcome::Escalated { .. } => "Escalation message sent",
            Outcome::ManagerReplyForwarded { .. } => "Manager reply forwarded",
            Outcome::NoActiveEscalation => NO_ACTIVE_ESCALATION,
            Outcome::EmptyManagerReply => EMPTY_MANAGER_REPLY,
        }
    }
}

/// One configurable pipeline. The classifier and the store are optional;
/// everything else is required.
pub struct InboundPipeline {
    settings: PipelineSettings,
    messenger: Arc<dyn Messenger>,
    completer: Arc<dyn Completer>,
    dispatcher: Arc<dyn EscalationDispatcher>,
    classifier: Option<Arc<dyn Classifier>>,
    store: Option<Arc<dyn Store>>,
}

/// The customer text as shown to the manager.
fn alert_text(body: &str) -> String {
    if body.trim().is_empty() {
        EMPTY_MESSAGE_PLACEHOLDER.to_string()
    } else {
        body.to_string()
    }
}

impl InboundPipeline {
    #[must_use]
    pub fn new(
        settings: PipelineSettings,
        messenger: Arc<dyn Messenger>,
        completer: Arc<dyn Completer>,
        dispatcher: Arc<dyn EscalationDispatcher>,
    ) -> Self {
        Self {
            settings,
            messenger,
            completer,
            dispatcher,
            classifier: None,
            store: None,
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    fn is_manager(&self, sender: &str) -> bool {
        !sender.trim().is_empty() && sender.trim() == self.settings.manager_number.trim()
    }

    /// Processes one inbound SMS end to end.
    pub async fn handle(&self, message: InboundMessage) -> Result<Outcome, RelayError> {
        if self.is_manager(&message.from) {
            info!("Inbound message is a manager reply");
            self.handle_manager_reply(&message).await
        } else {
            self.handle_customer_message(&message).await
        }
    }

    async fn handle_customer_message(
        &self,
        message: &InboundMessage,
    ) -> Result<Outcome, RelayError> {
        let mut importance_score = None;
        let mut classified = false;

        if let Some(classifier) = &self.classifier {
            let classification = classifier.classify(&message.body).await?;
            importance_score = classification.importance_score;
            classified = classification.needs_escalation;
        }

        let completion = if classified {
            info!(from = %message.from, "Classifier flagged message for escalation");
            Completion {
                text: ESCALATION_SENTINEL.to_string(),
                escalate: true,
            }
        } else {
            let request = self.completion_request(message).await?;
            self.completer.complete(&request).await?
        };

        let escalate = classified || completion.escalate;

        // Validated before anything is persisted or sent
        let mut payload = if escalate {
            let payload = EscalationPayload {
                original_message: alert_text(&message.body),
                from_number: message.from.trim().to_string(),
                importance_score,
                conversation_id: None,
            };
            payload.validate()?;
            Some(payload)
        } else {
            None
        };

        let conversation_id = match &self.store {
            Some(store) => {
                let record = store
                    .insert_conversation(&NewConversation {
                        sender: message.from.clone(),
                        message: message.body.clone(),
                        ai_response: completion.text.clone(),
                        is_escalated: escalate,
                    })
                    .await?;
                Some(record.id)
            }
            None => None,
        };

        if let Some(payload) = payload.as_mut() {
            payload.conversation_id = conversation_id;
            info!(
                from = %message.from,
                conversation_id = ?conversation_id,
                "ESCALATION NEEDED"
            );
            self.messenger
                .send(&message.from, ESCALATION_SENTINEL)
                .await?;
            self.dispatcher.dispatch(payload).await?;
            return Ok(Outcome::Escalated { conversation_id });
        }

        self.messenger.send(&message.from, &completion.text).await?;
        Ok(Outcome::Replied { conversation_id })
    }

    async fn completion_request(
        &self,
        message: &InboundMessage,
    ) -> Result<CompletionRequest, RelayError> {
        let learned = match &self.store {
            Some(store) => store.learned_pairs().await?,
            None => Vec::new(),
        };

        Ok(CompletionRequest {
            system_prompt: build_system_prompt(&self.settings.instructions, &learned),
            user_message: message.body.clone(),
        })
    }

    async fn handle_manager_reply(&self, message: &InboundMessage) -> Result<Outcome, RelayError> {
        let Some(store) = &self.store else {
            warn!("Manager reply received but persistence is disabled");
            return Ok(Outcome::NoActiveEscalation);
        };

        let (reference, stripped) = parse_manager_reply(&message.body);

        let referenced = match reference {
            Some(id) => store
                .conversation(id)
                .await?
                .filter(|r| r.is_escalated || r.manager_response.is_some())
                .map(|r| r.id),
            None => None,
        };

        let (reply_text, pending) = match referenced {
            Some(id) => (stripped, store.pending_escalation(id).await?),
            None => {
                if reference.is_some() {
                    debug!(
                        reference = ?reference,
                        "Reference names no escalation, treating as plain reply"
                    );
                }
                (
                    message.body.trim().to_string(),
                    store.latest_pending_escalation().await?,
                )
            }
        };

        if reply_text.is_empty() {
            info!("Manager reply has no text to forward");
            return Ok(Outcome::EmptyManagerReply);
        }

        let Some(record) = pending else {
            info!(reference = ?reference, "No active escalation for manager reply");
            return Ok(Outcome::NoActiveEscalation);
        };

        self.messenger
            .send(&record.sender, &format!("Manager replied: {reply_text}"))
            .await?;

        if store.resolve_escalation(record.id, &reply_text).await? {
            if record.message.trim().is_empty() {
                info!(conversation_id = record.id, "Blank question, not learning this reply");
            } else {
                store
                    .insert_learned_pair(&record.message, &reply_text)
                    .await?;
            }
        } else {
            warn!(
                conversation_id = record.id,
                "Escalation was resolved concurrently; not learning this reply"
            );
        }

        info!(
            conversation_id = record.id,
            customer = %record.sender,
            "Manager reply forwarded"
        );
        Ok(Outcome::ManagerReplyForwarded {
            customer: record.sender,
            conversation_id: record.id,
        })
    }
}
