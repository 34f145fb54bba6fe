mod common;

use common::{MANAGER, RecordingMessenger};
use serde_json::{Value, json};
use std::sync::Arc;

use sms_relay::ValidationRule;
use sms_relay::core::models::EscalationPayload;
use sms_relay::escalation::handler::{INTERNAL_ERROR_MESSAGE, SUCCESS_MESSAGE, handle_event};
use sms_relay::escalation::{EscalationNotifier, format_alert, validate_payload};

fn response_body(response: &Value) -> Value {
    let body = response["body"].as_str().expect("body should be a string");
    serde_json::from_str(body).expect("body should be JSON")
}

fn notifier_with(messenger: &Arc<RecordingMessenger>) -> EscalationNotifier {
    EscalationNotifier::new(messenger.clone(), MANAGER.to_string())
}

#[test]
fn test_missing_fields_rule() {
    let cases = [
        json!({}),
        json!({ "original_message": "Help" }),
        json!({ "from_number": "+15551234567" }),
        json!({ "original_message": "", "from_number": "+15551234567" }),
        json!({ "original_message": 42, "from_number": "+15551234567" }),
    ];

    for case in &cases {
        assert_eq!(
            validate_payload(case),
            Err(ValidationRule::MissingFields),
            "{case}"
        );
    }
    assert_eq!(
        ValidationRule::MissingFields.to_string(),
        "Missing required fields: original_message and from_number are required"
    );
}

#[test]
fn test_phone_format_rule() {
    for bad in ["5551234567", "+0555123", "+1", "+1555-123-4567", "++15551234567", "+1234567890123456"] {
        assert_eq!(
            validate_payload(&json!({ "original_message": "Hi", "from_number": bad })),
            Err(ValidationRule::InvalidPhoneNumber),
            "{bad}"
        );
    }
    for good in ["+15551234567", "+44", "+123456789012345"] {
        assert!(
            validate_payload(&json!({ "original_message": "Hi", "from_number": good })).is_ok(),
            "{good}"
        );
    }
}

#[test]
fn test_phone_rule_checked_before_score() {
    let raw = json!({
        "original_message": "Hi",
        "from_number": "not-a-number",
        "importance_score": "very"
    });
    assert_eq!(validate_payload(&raw), Err(ValidationRule::InvalidPhoneNumber));
}

#[test]
fn test_importance_score_rule() {
    for bad in [json!(-0.01), json!(1.5), json!("urgent"), json!({}), json!(false)] {
        let raw = json!({
            "original_message": "Hi",
            "from_number": "+15551234567",
            "importance_score": bad
        });
        assert_eq!(
            validate_payload(&raw),
            Err(ValidationRule::InvalidImportanceScore),
            "{raw}"
        );
    }
}

#[test]
fn test_alert_percentages() {
    for (score, expected) in [(0.0, "0%"), (0.005, "1%"), (0.5, "50%"), (0.854, "85%"), (1.0, "100%")] {
        let payload = validate_payload(&json!({
            "original_message": "Hi",
            "from_number": "+15551234567",
            "importance_score": score
        }))
        .unwrap();
        let alert = format_alert(&payload);
        assert!(
            alert.contains(&format!("(Importance: {expected})")),
            "{score} -> {alert}"
        );
    }
}

#[test]
fn test_alert_layout_without_score() {
    let payload = EscalationPayload {
        original_message: "Do you deliver?".to_string(),
        from_number: "+15551234567".to_string(),
        importance_score: None,
        conversation_id: None,
    };

    assert_eq!(
        format_alert(&payload),
        "🚨 ESCALATION ALERT\n\nFrom: +15551234567\nMessage: Do you deliver?"
    );
}

#[test]
fn test_alert_formatting_is_deterministic() {
    let payload = EscalationPayload {
        original_message: "Large order for Friday".to_string(),
        from_number: "+15551234567".to_string(),
        importance_score: Some(0.73),
        conversation_id: Some(9),
    };

    let first = format_alert(&payload);
    let second = format_alert(&payload);
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert!(first.ends_with("Ref: #9 (start your reply with #9 to answer this customer)"));
}

#[tokio::test]
async fn test_api_gateway_event_success() {
    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = notifier_with(&messenger);

    let event = json!({
        "body": json!({
            "original_message": "Where is my order?",
            "from_number": "+15551234567",
            "importance_score": 0.9
        }).to_string()
    });

    let response = handle_event(&notifier, &event).await;

    assert_eq!(response["statusCode"], 200);
    assert_eq!(response["headers"]["Content-Type"], "application/json");
    let body = response_body(&response);
    assert_eq!(body["message"], SUCCESS_MESSAGE);
    assert!(body["timestamp"].is_string());

    let alerts = messenger.sent_to(MANAGER);
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("(Importance: 90%)"));
    assert!(alerts[0].contains("Message: Where is my order?"));
}

#[tokio::test]
async fn test_validation_failure_is_400() {
    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = notifier_with(&messenger);

    let event = json!({ "body": json!({ "original_message": "Hi" }).to_string() });
    let response = handle_event(&notifier, &event).await;

    assert_eq!(response["statusCode"], 400);
    assert_eq!(
        response_body(&response)["error"],
        "Missing required fields: original_message and from_number are required"
    );
    assert!(messenger.sent().is_empty());
}

#[tokio::test]
async fn test_messenger_failure_is_generic_500() {
    let messenger = Arc::new(RecordingMessenger::failing());
    let notifier = notifier_with(&messenger);

    let event = json!({
        "original_message": "Hi",
        "from_number": "+15551234567"
    });
    let response = handle_event(&notifier, &event).await;

    assert_eq!(response["statusCode"], 500);
    assert_eq!(response_body(&response)["error"], INTERNAL_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_duplicate_invocations_send_duplicate_alerts() {
    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = notifier_with(&messenger);
    let event = json!({ "original_message": "Hi", "from_number": "+15551234567" });

    handle_event(&notifier, &event).await;
    handle_event(&notifier, &event).await;

    let alerts = messenger.sent_to(MANAGER);
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0], alerts[1]);
}

#[tokio::test]
async fn test_sqs_batch_processes_every_record() {
    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = notifier_with(&messenger);

    let event = json!({
        "Records": [
            { "body": json!({ "original_message": "First", "from_number": "+15551234567", "conversation_id": 3 }).to_string() },
            { "body": "not json" },
            { "body": json!({ "original_message": "Third", "from_number": "bad" }).to_string() },
            { "body": json!({ "message": "Legacy", "fromNumber": "+15557654321" }).to_string() }
        ]
    });

    let summary = handle_event(&notifier, &event).await;

    assert_eq!(summary, json!({ "sent": 2, "failed": 2 }));
    let alerts = messenger.sent_to(MANAGER);
    assert_eq!(alerts.len(), 2);
    assert!(alerts[0].contains("Ref: #3"));
    assert!(alerts[1].contains("Message: Legacy"));
}

#[tokio::test]
async fn test_invalid_json_body_is_400() {
    let messenger = Arc::new(RecordingMessenger::default());
    let notifier = notifier_with(&messenger);

    let response = handle_event(&notifier, &json!({ "body": "{oops" })).await;

    assert_eq!(response["statusCode"], 400);
    assert!(messenger.sent().is_empty());
}
