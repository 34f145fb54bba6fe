//! Persistence for conversation records and learned Q&A pairs.
//!
//! The store is a plain async trait so the pipeline can run against libSQL in
//! production and an in-memory map in development and tests. There are no
//! transactions: callers perform read, update and insert as separate steps.

pub mod libsql_backend;
pub mod memory;

use async_trait::async_trait;

use crate::core::models::{ConversationRecord, LearnedPair, NewConversation};
use crate::errors::RelayError;

pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a conversation record and return it with its assigned id.
    async fn insert_conversation(
        &self,
        new: &NewConversation,
    ) -> Result<ConversationRecord, RelayError>;

    /// Fetch a conversation by id.
    async fn conversation(&self, id: i64) -> Result<Option<ConversationRecord>, RelayError>;

    /// The most recently created record that is still escalated.
    async fn latest_pending_escalation(&self) -> Result<Option<ConversationRecord>, RelayError>;

    /// A specific record, only if it is still escalated.
    async fn pending_escalation(&self, id: i64) -> Result<Option<ConversationRecord>, RelayError>;

    /// Record the manager's answer and clear the escalation flag.
    ///
    /// Returns `false` when the record was no longer pending (already
    /// resolved by a concurrent reply, or unknown).
    async fn resolve_escalation(&self, id: i64, manager_response: &str)
    -> Result<bool, RelayError>;

    async fn insert_learned_pair(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<LearnedPair, RelayError>;

    /// Every learned pair, oldest first.
    async fn learned_pairs(&self) -> Result<Vec<LearnedPair>, RelayError>;
}
