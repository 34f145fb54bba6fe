//! Escalation Notifier: payload validation, alert formatting, delivery to the
//! manager, and the dispatchers the Message Lambda uses to reach it.

pub mod handler;
pub mod queue;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::core::models::EscalationPayload;
use crate::errors::{RelayError, ValidationRule};
use crate::messaging::Messenger;

pub use queue::SqsDispatcher;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("static regex compile"));

/// E.164-shaped: leading `+`, non-zero first digit, 2 to 15 digits total.
#[must_use]
pub fn is_valid_phone_number(number: &str) -> bool {
    PHONE_RE.is_match(number)
}

fn non_empty_str<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| raw.get(*k).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
}

fn parse_score(raw: Option<&Value>) -> Result<Option<f64>, ValidationRule> {
    let score = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match score {
        Some(s) if (0.0..=1.0).contains(&s) => Ok(Some(s)),
        _ => Err(ValidationRule::InvalidImportanceScore),
    }
}

/// Validates an untyped escalation payload.
///
/// Rules are checked in order: required fields, phone number shape,
/// importance score. `message`/`fromNumber` are accepted as aliases.
pub fn validate_payload(raw: &Value) -> Result<EscalationPayload, ValidationRule> {
    let (Some(original_message), Some(from_number)) = (
        non_empty_str(raw, &["original_message", "message"]),
        non_empty_str(raw, &["from_number", "fromNumber"]),
    ) else {
        return Err(ValidationRule::MissingFields);
    };

    if !is_valid_phone_number(from_number) {
        return Err(ValidationRule::InvalidPhoneNumber);
    }

    let importance_score = parse_score(raw.get("importance_score"))?;

    Ok(EscalationPayload {
        original_message: original_message.to_string(),
        from_number: from_number.to_string(),
        importance_score,
        conversation_id: raw.get("conversation_id").and_then(Value::as_i64),
    })
}

impl EscalationPayload {
    /// Same rules as [`validate_payload`], for an already typed payload.
    pub fn validate(&self) -> Result<(), ValidationRule> {
        if self.original_message.is_empty() || self.from_number.is_empty() {
            return Err(ValidationRule::MissingFields);
        }
        if !is_valid_phone_number(&self.from_number) {
            return Err(ValidationRule::InvalidPhoneNumber);
        }
        match self.importance_score {
            Some(s) if !(0.0..=1.0).contains(&s) => Err(ValidationRule::InvalidImportanceScore),
            _ => Ok(()),
        }
    }
}

/// Renders the SMS sent to the manager. Pure: equal payloads give equal text.
#[must_use]
pub fn format_alert(payload: &EscalationPayload) -> String {
    let score_text = payload
        .importance_score
        .map(|s| format!(" (Importance: {}%)", (s * 100.0).round() as i64))
        .unwrap_or_default();

    let mut alert = format!(
        "🚨 ESCALATION ALERT{score_text}\n\nFrom: {}\nMessage: {}",
        payload.from_number, payload.original_message
    );

    if let Some(id) = payload.conversation_id {
        alert.push_str(&format!(
            "\nRef: #{id} (start your reply with #{id} to answer this customer)"
        ));
    }

    alert
}

/// Sends validated escalation alerts to the manager's phone.
pub struct EscalationNotifier {
    messenger: Arc<dyn Messenger>,
    manager_number: String,
}

impl EscalationNotifier {
    #[must_use]
    pub fn new(messenger: Arc<dyn Messenger>, manager_number: String) -> Self {
        Self {
            messenger,
            manager_number,
        }
    }

    /// Validate, format and send. Returns the provider message id.
    pub async fn notify(&self, payload: &EscalationPayload) -> Result<String, RelayError> {
        payload.validate()?;

        let alert = format_alert(payload);
        let sid = self.messenger.send(&self.manager_number, &alert).await?;

        info!(
            from_number = %payload.from_number,
            importance_score = ?payload.importance_score,
            conversation_id = ?payload.conversation_id,
            "Escalation sent successfully"
        );
        Ok(sid)
    }

    /// Entry point for untyped payloads arriving at the Escalate Lambda.
    pub async fn notify_raw(&self, raw: &Value) -> Result<EscalationPayload, RelayError> {
        let payload = validate_payload(raw)?;
        self.notify(&payload).await?;
        Ok(payload)
    }
}

/// How the Message Lambda hands an escalation to the notifier.
#[async_trait]
pub trait EscalationDispatcher: Send + Sync {
    async fn dispatch(&self, payload: &EscalationPayload) -> Result<(), RelayError>;
}

/// Runs the notifier inside the calling Lambda.
pub struct DirectDispatcher {
    notifier: EscalationNotifier,
}

impl DirectDispatcher {
    #[must_use]
    pub fn new(notifier: EscalationNotifier) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl EscalationDispatcher for DirectDispatcher {
    async fn dispatch(&self, payload: &EscalationPayload) -> Result<(), RelayError> {
        self.notifier.notify(payload).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn phone_shape_boundaries() {
        assert!(is_valid_phone_number("+12"));
        assert!(is_valid_phone_number("+123456789012345"));
        assert!(!is_valid_phone_number("+1"));
        assert!(!is_valid_phone_number("+1234567890123456"));
        assert!(!is_valid_phone_number("+0123456"));
        assert!(!is_valid_phone_number("15551234567"));
        assert!(!is_valid_phone_number("+1555 123 4567"));
    }

    #[test]
    fn score_accepts_numeric_strings() {
        assert_eq!(parse_score(Some(&json!("0.25"))), Ok(Some(0.25)));
        assert_eq!(parse_score(Some(&json!(1))), Ok(Some(1.0)));
        assert_eq!(parse_score(Some(&Value::Null)), Ok(None));
        assert_eq!(parse_score(None), Ok(None));
    }

    #[test]
    fn score_rejects_non_numbers() {
        for bad in [json!("high"), json!(true), json!([0.5]), json!("NaN"), json!(1.01)] {
            assert_eq!(
                parse_score(Some(&bad)),
                Err(ValidationRule::InvalidImportanceScore),
                "{bad}"
            );
        }
    }

    #[test]
    fn legacy_camel_case_keys_are_accepted() {
        let payload = validate_payload(&json!({
            "fromNumber": "+15551234567",
            "message": "Need help"
        }))
        .unwrap();
        assert_eq!(payload.from_number, "+15551234567");
        assert_eq!(payload.original_message, "Need help");
    }
}
