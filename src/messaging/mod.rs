//! Outbound SMS and the TwiML acknowledgments returned to the provider

pub mod mock;
pub mod twiml;
pub mod twilio;

use async_trait::async_trait;

use crate::errors::RelayError;

pub use mock::LogMessenger;
pub use twilio::TwilioMessenger;

/// Sends one SMS and returns the provider's message id.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<String, RelayError>;
}
