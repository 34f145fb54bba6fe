//! libSQL backend for the conversation store.
//!
//! Works against a local file, `:memory:`, or a remote libSQL/Turso database.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Database, Row, Value, params};
use tracing::{debug, info};

use super::Store;
use crate::core::models::{ConversationRecord, LearnedPair, NewConversation};
use crate::errors::RelayError;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS conversations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sender TEXT NOT NULL,
        message TEXT NOT NULL,
        ai_response TEXT NOT NULL,
        is_escalated INTEGER NOT NULL DEFAULT 0,
        manager_response TEXT,
        created_at TEXT NOT NULL,
        resolved_at TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_conversations_pending
        ON conversations(is_escalated, created_at);

    CREATE TABLE IF NOT EXISTS learned_pairs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
"#;

const CONVERSATION_COLUMNS: &str =
    "id, sender, message, ai_response, is_escalated, manager_response, created_at, resolved_at";

const LEARNED_COLUMNS: &str = "id, question, answer, created_at";

pub struct LibSqlStore {
    // The Database must outlive the Connection opened from it
    _db: Database,
    conn: Connection,
}

impl LibSqlStore {
    /// Open the database named by `url` and make sure the schema exists.
    ///
    /// `libsql://`, `http://` and `https://` URLs are remote databases and use
    /// `auth_token`; anything else is a local path (or `:memory:`).
    pub async fn open(url: &str, auth_token: Option<String>) -> Result<Self, RelayError> {
        let db = if is_remote_url(url) {
            libsql::Builder::new_remote(url.to_string(), auth_token.unwrap_or_default())
                .build()
                .await
        } else {
            libsql::Builder::new_local(url).build().await
        }
        .map_err(|e| RelayError::StoreError(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| RelayError::StoreError(format!("Failed to create connection: {e}")))?;

        conn.execute_batch(SCHEMA)
            .await
            .map_err(|e| RelayError::StoreError(format!("Failed to create schema: {e}")))?;

        info!(remote = is_remote_url(url), "Conversation store opened");
        Ok(Self { _db: db, conn })
    }

    /// In-memory database (for tests).
    pub async fn open_memory() -> Result<Self, RelayError> {
        Self::open(":memory:", None).await
    }

    async fn query_conversation(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Option<ConversationRecord>, RelayError> {
        let mut rows = self.conn.query(sql, params).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_conversation(&row)?)),
            None => Ok(None),
        }
    }
}

fn is_remote_url(url: &str) -> bool {
    url.starts_with("libsql://") || url.starts_with("https://") || url.starts_with("http://")
}

fn now_text() -> String {
    // Fixed-width timestamps keep lexical ORDER BY chronological.
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn opt_text(row: &Row, idx: i32) -> Result<Option<String>, libsql::Error> {
    match row.get_value(idx)? {
        Value::Text(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn row_to_conversation(row: &Row) -> Result<ConversationRecord, libsql::Error> {
    let created_at: String = row.get(6)?;
    Ok(ConversationRecord {
        id: row.get(0)?,
        sender: row.get(1)?,
        message: row.get(2)?,
        ai_response: row.get(3)?,
        is_escalated: row.get::<i64>(4)? != 0,
        manager_response: opt_text(row, 5)?,
        created_at: parse_datetime(&created_at),
        resolved_at: opt_text(row, 7)?.as_deref().map(parse_datetime),
    })
}

fn row_to_learned(row: &Row) -> Result<LearnedPair, libsql::Error> {
    let created_at: String = row.get(3)?;
    Ok(LearnedPair {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        created_at: parse_datetime(&created_at),
    })
}

#[async_trait]
impl Store for LibSqlStore {
    async fn insert_conversation(
        &self,
        new: &NewConversation,
    ) -> Result<ConversationRecord, RelayError> {
        let sql = format!(
            "INSERT INTO conversations (sender, message, ai_response, is_escalated, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {CONVERSATION_COLUMNS}"
        );
        let record = self
            .query_conversation(
                &sql,
                params![
                    new.sender.as_str(),
                    new.message.as_str(),
                    new.ai_response.as_str(),
                    i64::from(new.is_escalated),
                    now_text(),
                ],
            )
            .await?
            .ok_or_else(|| RelayError::StoreError("insert_conversation: no row returned".into()))?;

        debug!(id = record.id, escalated = record.is_escalated, "Conversation inserted");
        Ok(record)
    }

    async fn conversation(&self, id: i64) -> Result<Option<ConversationRecord>, RelayError> {
        let sql = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1");
        self.query_conversation(&sql, params![id]).await
    }

    async fn latest_pending_escalation(&self) -> Result<Option<ConversationRecord>, RelayError> {
        let sql = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations
             WHERE is_escalated = 1
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        self.query_conversation(&sql, ()).await
    }

    async fn pending_escalation(&self, id: i64) -> Result<Option<ConversationRecord>, RelayError> {
        let sql = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1 AND is_escalated = 1"
        );
        self.query_conversation(&sql, params![id]).await
    }

    async fn resolve_escalation(
        &self,
        id: i64,
        manager_response: &str,
    ) -> Result<bool, RelayError> {
        let changed = self
            .conn
            .execute(
                "UPDATE conversations
                 SET manager_response = ?1, is_escalated = 0, resolved_at = ?2
                 WHERE id = ?3 AND is_escalated = 1",
                params![manager_response, now_text(), id],
            )
            .await?;

        debug!(id, changed, "Escalation resolve attempted");
        Ok(changed > 0)
    }

    async fn insert_learned_pair(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<LearnedPair, RelayError> {
        let sql = format!(
            "INSERT INTO learned_pairs (question, answer, created_at)
             VALUES (?1, ?2, ?3)
             RETURNING {LEARNED_COLUMNS}"
        );
        let mut rows = self
            .conn
            .query(&sql, params![question, answer, now_text()])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| RelayError::StoreError("insert_learned_pair: no row returned".into()))?;
        Ok(row_to_learned(&row)?)
    }

    async fn learned_pairs(&self) -> Result<Vec<LearnedPair>, RelayError> {
        let sql = format!("SELECT {LEARNED_COLUMNS} FROM learned_pairs ORDER BY id ASC");
        let mut rows = self.conn.query(&sql, ()).await?;

        let mut pairs = Vec::new();
        while let Some(row) = rows.next().await? {
            pairs.push(row_to_learned(&row)?);
        }
        Ok(pairs)
    }
}
