//! Twilio REST API client
//!
//! Sends SMS through `POST /2010-04-01/Accounts/{sid}/Messages.json`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use super::Messenger;
use crate::errors::RelayError;

const DEFAULT_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

pub struct TwilioMessenger {
    http: Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    api_base: String,
}

impl TwilioMessenger {
    pub fn new(
        account_sid: String,
        auth_token: String,
        from_number: String,
    ) -> Result<Self, RelayError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                RelayError::HttpError(format!("Failed to build Twilio HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            account_sid,
            auth_token,
            from_number,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.api_base = base_url.trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        )
    }
}

#[async_trait]
impl Messenger for TwilioMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<String, RelayError> {
        let params = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| RelayError::MessagingError(format!("Twilio request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            let detail = serde_json::from_str::<TwilioErrorBody>(&error_text)
                .ok()
                .and_then(|b| {
                    b.message
                        .map(|m| format!("{} (code {})", m, b.code.unwrap_or_default()))
                })
                .unwrap_or(error_text);
            return Err(RelayError::MessagingError(format!(
                "Twilio API error (status {status}): {detail}"
            )));
        }

        let message: MessageResource = response.json().await.map_err(|e| {
            RelayError::MessagingError(format!("Failed to parse Twilio response: {e}"))
        })?;

        info!(to = %to, sid = %message.sid, "SMS sent");
        Ok(message.sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_messenger(base_url: &str) -> TwilioMessenger {
        TwilioMessenger::new(
            "AC123".to_string(),
            "token".to_string(),
            "+15550000000".to_string(),
        )
        .unwrap()
        .with_base_url(base_url.to_string())
    }

    #[tokio::test]
    async fn send_posts_form_and_returns_sid() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(header_exists("authorization"))
            .and(body_string_contains("To=%2B15551234567"))
            .and(body_string_contains("From=%2B15550000000"))
            .and(body_string_contains("Body=Hello+there"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "sid": "SM42",
                "status": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sid = test_messenger(&server.uri())
            .send("+15551234567", "Hello there")
            .await
            .unwrap();

        assert_eq!(sid, "SM42");
    }

    #[tokio::test]
    async fn send_reports_twilio_error_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 21211,
                "message": "The 'To' number is not a valid phone number.",
                "status": 400
            })))
            .mount(&server)
            .await;

        let err = test_messenger(&server.uri())
            .send("bogus", "Hi")
            .await
            .unwrap_err();

        match err {
            RelayError::MessagingError(msg) => {
                assert!(msg.contains("21211"));
                assert!(msg.contains("not a valid phone number"));
            }
            other => panic!("Unexpected error type: {other:?}"),
        }
    }
}
