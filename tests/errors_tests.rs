use sms_relay::errors::{RelayError, ValidationRule};
use std::error::Error;

#[test]
fn test_relay_error_implements_error_trait() {
    fn assert_error<T: Error>(_: &T) {}

    let error = RelayError::ParseError("test error".to_string());
    assert_error(&error);
    assert_error(&ValidationRule::MissingFields);
}

#[test]
fn test_relay_error_display() {
    let error = RelayError::MessagingError("queue full".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to access messaging API: queue full"
    );

    let error = RelayError::OpenAIError("Model unavailable".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to access OpenAI API: Model unavailable"
    );

    let error = RelayError::HttpError("Connection error".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to send HTTP request: Connection error"
    );
}

#[test]
fn test_validation_errors_display_the_rule() {
    let error: RelayError = ValidationRule::InvalidPhoneNumber.into();
    assert_eq!(error.to_string(), "Invalid phone number format");
    assert!(error.is_client_error());

    let error: RelayError = ValidationRule::InvalidImportanceScore.into();
    assert_eq!(
        error.to_string(),
        "Importance score must be a number between 0 and 1"
    );

    assert!(!RelayError::StoreError("down".to_string()).is_client_error());
}

#[test]
fn test_relay_error_from_conversions() {
    let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let relay_err: RelayError = err.into();
    assert!(matches!(relay_err, RelayError::ParseError(_)));

    // Only checks that the conversion exists
    #[allow(unused)]
    fn _check_reqwest_conversion(err: reqwest::Error) -> RelayError {
        RelayError::from(err)
    }
}
