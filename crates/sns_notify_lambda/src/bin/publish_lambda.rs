use std::sync::Arc;

use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use sns_notify_core::{NotificationConfig, NotificationTemplate};
use sns_notify_lambda::adapters::sns::SnsTopicService;
use sns_notify_lambda::handlers::publish::{handle_publish_event, PublishResponse};
use tracing_subscriber::EnvFilter;

async fn handle_request(
    template: &NotificationTemplate<SnsTopicService>,
    event: LambdaEvent<Value>,
) -> Result<PublishResponse, Error> {
    let published_at = Utc::now().to_rfc3339();
    handle_publish_event(template, event.payload, &published_at)
        .map_err(|error| Error::from(error.to_json().to_string()))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = NotificationConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    tracing::info!(
        default_destination = ?config.default_destination,
        auto_create_topics = config.auto_create_topics,
        "starting publish lambda"
    );

    let service = SnsTopicService::from_env().await;
    let template = Arc::new(NotificationTemplate::from_config(service, &config));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let template = Arc::clone(&template);
        async move { handle_request(&template, event).await }
    }))
    .await
}
