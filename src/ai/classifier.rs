//! Optional intent classifier that can escalate a message before the model sees it.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::info;

use crate::core::models::Classification;
use crate::errors::RelayError;

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, RelayError>;
}

/// Classifier reached over HTTP: `POST {"text": ...}` returning
/// `{"needs_escalation": bool, "importance_score": number?}`.
pub struct HttpClassifier {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpClassifier {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self, RelayError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                RelayError::HttpError(format!("Failed to build classifier HTTP client: {e}"))
            })?;
        Ok(Self {
            http,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, RelayError> {
        let mut request = self.http.post(&self.endpoint).json(&json!({ "text": text }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            RelayError::ClassifierError(format!("Classifier request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(RelayError::ClassifierError(format!(
                "Classifier error (status {status}): {error_text}"
            )));
        }

        let classification: Classification = response.json().await.map_err(|e| {
            RelayError::ClassifierError(format!("Failed to parse classifier response: {e}"))
        })?;

        info!(
            needs_escalation = classification.needs_escalation,
            importance_score = ?classification.importance_score,
            "Message classified"
        );
        Ok(classification)
    }
}
