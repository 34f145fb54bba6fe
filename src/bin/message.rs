// Lambda entry point for the Message function
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;
use sms_relay::api::{build_pipeline, handler};
use sms_relay::core::config::AppConfig;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    sms_relay::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;

    let pipeline = build_pipeline(&config).await.map_err(|e| {
        error!("Failed to initialize pipeline: {}", e);
        Error::from(format!("Pipeline Initialization Error: {}", e))
    })?;
    let pipeline = &pipeline;
    let format = config.response_format;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(pipeline, format, event).await
    }))
    .await
}
