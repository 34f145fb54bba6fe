use std::env;

const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAX_TOKENS: i64 = 160;
const DEFAULT_TEMPERATURE: f64 = 0.5;

/// Which SMS transport the Lambdas talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagingMode {
    Twilio,
    /// Log outbound SMS instead of sending them.
    Mock,
}

/// How the Message Lambda shapes its HTTP acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Twiml,
    Json,
}

impl ResponseFormat {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "twiml" | "xml" => Ok(ResponseFormat::Twiml),
            "json" => Ok(ResponseFormat::Json),
            other => Err(format!("RESPONSE_FORMAT: unsupported value '{other}'")),
        }
    }
}

/// Settings shared by both Lambdas: how to send SMS and who the manager is.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    pub mode: MessagingMode,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_api_base: Option<String>,
    pub twilio_phone_number: String,
    pub manager_phone_number: String,
}

impl MessagingConfig {
    pub fn from_env() -> Result<Self, String> {
        let mode = messaging_mode(
            env::var("MESSAGING_MODE").ok().as_deref(),
            env::var("NODE_ENV").ok().as_deref(),
        )?;

        let (twilio_account_sid, twilio_auth_token) = match mode {
            MessagingMode::Twilio => (
                Some(required("TWILIO_ACCOUNT_SID")?),
                Some(required("TWILIO_AUTH_TOKEN")?),
            ),
            MessagingMode::Mock => (
                env::var("TWILIO_ACCOUNT_SID").ok(),
                env::var("TWILIO_AUTH_TOKEN").ok(),
            ),
        };

        Ok(Self {
            mode,
            twilio_account_sid,
            twilio_auth_token,
            twilio_api_base: optional("TWILIO_API_BASE"),
            twilio_phone_number: required("TWILIO_PHONE_NUMBER")?,
            manager_phone_number: required("MANAGER_PHONE_NUMBER")?,
        })
    }
}

/// Full configuration of the Message Lambda.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub messaging: MessagingConfig,
    pub openai_api_key: String,
    pub openai_org_id: Option<String>,
    pub openai_api_base: Option<String>,
    pub openai_model: String,
    pub openai_max_tokens: i64,
    pub openai_temperature: f64,
    pub system_prompt: Option<String>,
    /// Classifier step runs only when this is set.
    pub classifier_endpoint: Option<String>,
    pub classifier_api_key: Option<String>,
    /// Persistence is enabled only when this is set.
    pub database_url: Option<String>,
    pub database_auth_token: Option<String>,
    /// Escalations are queued here; without it the notifier runs in-process.
    pub escalation_queue_url: Option<String>,
    pub response_format: ResponseFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let response_format = match optional("RESPONSE_FORMAT") {
            Some(raw) => ResponseFormat::parse(&raw)?,
            None => ResponseFormat::default(),
        };

        Ok(Self {
            messaging: MessagingConfig::from_env()?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_org_id: optional("OPENAI_ORG_ID"),
            openai_api_base: optional("OPENAI_API_BASE"),
            openai_model: optional("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_max_tokens: parsed("OPENAI_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            openai_temperature: parsed("OPENAI_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            system_prompt: optional("SYSTEM_PROMPT"),
            classifier_endpoint: optional("CLASSIFIER_ENDPOINT"),
            classifier_api_key: optional("CLASSIFIER_API_KEY"),
            database_url: optional("DATABASE_URL"),
            database_auth_token: optional("DATABASE_AUTH_TOKEN"),
            escalation_queue_url: optional("ESCALATION_QUEUE_URL"),
            response_format,
        })
    }
}

/// `MESSAGING_MODE` wins; otherwise `NODE_ENV=development` selects the mock.
pub fn messaging_mode(
    messaging_mode: Option<&str>,
    node_env: Option<&str>,
) -> Result<MessagingMode, String> {
    match messaging_mode.map(|m| m.trim().to_ascii_lowercase()) {
        Some(m) if m == "mock" => Ok(MessagingMode::Mock),
        Some(m) if m == "twilio" => Ok(MessagingMode::Twilio),
        Some(m) => Err(format!("MESSAGING_MODE: unsupported value '{m}'")),
        None if node_env == Some("development") => Ok(MessagingMode::Mock),
        None => Ok(MessagingMode::Twilio),
    }
}

fn required(name: &str) -> Result<String, String> {
    env::var(name).map_err(|e| format!("{}: {}", name, e))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(name: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| format!("{}: {}", name, e)),
        None => Ok(default),
    }
}
