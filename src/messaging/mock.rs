use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::Messenger;
use crate::errors::RelayError;

/// Message id returned for every mocked send.
pub const MOCK_MESSAGE_SID: &str = "mock_message_sid";

/// Development messenger: logs the SMS instead of sending it.
pub struct LogMessenger {
    from_number: String,
}

impl LogMessenger {
    #[must_use]
    pub fn new(from_number: String) -> Self {
        Self { from_number }
    }
}

#[async_trait]
impl Messenger for LogMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<String, RelayError> {
        info!(
            to = %to,
            from = %self.from_number,
            body = %body,
            timestamp = %Utc::now().to_rfc3339(),
            "Mock SMS"
        );
        Ok(MOCK_MESSAGE_SID.to_string())
    }
}
