use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::Store;
use crate::core::models::{ConversationRecord, LearnedPair, NewConversation};
use crate::errors::RelayError;

#[derive(Default)]
struct Tables {
    conversations: Vec<ConversationRecord>,
    learned: Vec<LearnedPair>,
}

/// Process-local store. Contents vanish with the Lambda instance, so it is
/// meant for development runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every conversation record, in insertion order.
    pub async fn conversations(&self) -> Vec<ConversationRecord> {
        self.tables.lock().await.conversations.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_conversation(
        &self,
        new: &NewConversation,
    ) -> Result<ConversationRecord, RelayError> {
        let mut tables = self.tables.lock().await;
        let record = ConversationRecord {
            id: tables.conversations.len() as i64 + 1,
            sender: new.sender.clone(),
            message: new.message.clone(),
            ai_response: new.ai_response.clone(),
            is_escalated: new.is_escalated,
            manager_response: None,
            created_at: Utc::now(),
            resolved_at: None,
        };
        tables.conversations.push(record.clone());
        Ok(record)
    }

    async fn conversation(&self, id: i64) -> Result<Option<ConversationRecord>, RelayError> {
        let tables = self.tables.lock().await;
        Ok(tables.conversations.iter().find(|r| r.id == id).cloned())
    }

    async fn latest_pending_escalation(&self) -> Result<Option<ConversationRecord>, RelayError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .conversations
            .iter()
            .filter(|r| r.is_escalated)
            .max_by_key(|r| (r.created_at, r.id))
            .cloned())
    }

    async fn pending_escalation(&self, id: i64) -> Result<Option<ConversationRecord>, RelayError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .conversations
            .iter()
            .find(|r| r.id == id && r.is_escalated)
            .cloned())
    }

    async fn resolve_escalation(
        &self,
        id: i64,
        manager_response: &str,
    ) -> Result<bool, RelayError> {
        let mut tables = self.tables.lock().await;
        match tables
            .conversations
            .iter_mut()
            .find(|r| r.id == id && r.is_escalated)
        {
            Some(record) => {
                record.is_escalated = false;
                record.manager_response = Some(manager_response.to_string());
                record.resolved_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_learned_pair(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<LearnedPair, RelayError> {
        let mut tables = self.tables.lock().await;
        let pair = LearnedPair {
            id: tables.learned.len() as i64 + 1,
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: Utc::now(),
        };
        tables.learned.push(pair.clone());
        Ok(pair)
    }

    async fn learned_pairs(&self) -> Result<Vec<LearnedPair>, RelayError> {
        Ok(self.tables.lock().await.learned.clone())
    }
}
