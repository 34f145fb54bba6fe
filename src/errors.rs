use openai_api_rs::v1::error::APIError;
use std::fmt;
use thiserror::Error;

/// Rules an escalation payload can violate. The display text is what the
/// Escalate Lambda returns to the caller in its 400 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    MissingFields,
    InvalidPhoneNumber,
    InvalidImportanceScore,
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ValidationRule::MissingFields => {
                "Missing required fields: original_message and from_number are required"
            }
            ValidationRule::InvalidPhoneNumber => "Invalid phone number format",
            ValidationRule::InvalidImportanceScore => {
                "Importance score must be a number between 0 and 1"
            }
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ValidationRule {}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to parse request: {0}")]
    ParseError(String),

    #[error("{0}")]
    Validation(#[from] ValidationRule),

    #[error("Failed to access messaging API: {0}")]
    MessagingError(String),

    #[error("Failed to access OpenAI API: {0}")]
    OpenAIError(String),

    #[error("Failed to access classification service: {0}")]
    ClassifierError(String),

    #[error("Failed to access conversation store: {0}")]
    StoreError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl RelayError {
    /// Whether this error is the caller's fault rather than a collaborator failure.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, RelayError::Validation(_))
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(error: reqwest::Error) -> Self {
        RelayError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(error: serde_json::Error) -> Self {
        RelayError::ParseError(error.to_string())
    }
}

impl From<libsql::Error> for RelayError {
    fn from(error: libsql::Error) -> Self {
        RelayError::StoreError(error.to_string())
    }
}

impl From<APIError> for RelayError {
    fn from(error: APIError) -> Self {
        RelayError::OpenAIError(format!("OpenAI API error: {}", error))
    }
}
