use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An SMS received by the Message Lambda. Lives for one invocation only.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub from: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    #[must_use]
    pub fn new(from: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            body: body.into(),
            received_at: Utc::now(),
        }
    }
}

/// A persisted customer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: i64,
    pub sender: String,
    pub message: String,
    pub ai_response: String,
    pub is_escalated: bool,
    pub manager_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Fields needed to insert a `ConversationRecord`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConversation {
    pub sender: String,
    pub message: String,
    pub ai_response: String,
    pub is_escalated: bool,
}

/// A question/answer pair learned from a manager resolving an escalation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedPair {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

/// What the Message Lambda hands to the Escalate Lambda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationPayload {
    pub original_message: String,
    pub from_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<i64>,
}

/// Result of the optional pre-classification step.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Classification {
    pub needs_escalation: bool,
    #[serde(default)]
    pub importance_score: Option<f64>,
}
