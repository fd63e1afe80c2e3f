use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sns_notify_core::{
    ErrorKind, HeaderValue, MessageHeaders, NotificationTemplate, Payload, SendOptions,
    TopicService,
};

/// Publish request as received by the Lambda.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublishEvent {
    #[serde(default)]
    pub destination: Option<String>,
    pub message: Value,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishResponse {
    pub status: String,
    pub topic_arn: String,
    pub message_id: Option<String>,
    pub published_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishHandlerError {
    pub error_code: &'static str,
    pub message: String,
}

impl PublishHandlerError {
    fn malformed(message: impl Into<String>) -> Self {
        Self {
            error_code: "malformed_event",
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": self.error_code,
            "message": self.message,
        })
    }
}

impl std::fmt::Display for PublishHandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code, self.message)
    }
}

impl std::error::Error for PublishHandlerError {}

fn error_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidArgument => "invalid_argument",
        ErrorKind::InvalidState => "missing_destination",
        ErrorKind::Resolution => "unresolved_destination",
        ErrorKind::Provider => "provider_error",
    }
}

/// Publishes the message described by `event` through `template`.
///
/// Accepts the event either directly or wrapped in an API Gateway style
/// `body` field. A JSON string `message` is published as text; any other
/// JSON value is rejected before the topic service is called.
pub fn handle_publish_event<S: TopicService>(
    template: &NotificationTemplate<S>,
    event: Value,
    published_at: &str,
) -> Result<PublishResponse, PublishHandlerError> {
    let payload = normalize_event(event).map_err(PublishHandlerError::malformed)?;
    let event: PublishEvent = serde_json::from_value(payload)
        .map_err(|error| PublishHandlerError::malformed(format!("Malformed event: {error}")))?;

    let headers: MessageHeaders = event
        .headers
        .into_iter()
        .map(|(name, value)| (name, HeaderValue::from(value)))
        .collect();

    let mut options = SendOptions::new().headers(headers);
    if let Some(destination) = event.destination.filter(|value| !value.trim().is_empty()) {
        options = options.to(destination);
    }
    if let Some(subject) = event.subject {
        options = options.subject(subject);
    }

    let receipt = template
        .convert_and_send(Payload::from(event.message), options)
        .map_err(|error| PublishHandlerError {
            error_code: error_code(error.kind()),
            message: error.to_string(),
        })?;

    Ok(PublishResponse {
        status: "published".to_string(),
        topic_arn: receipt.topic_arn,
        message_id: receipt.message_id,
        published_at: published_at.to_string(),
    })
}

fn normalize_event(event: Value) -> Result<Value, String> {
    let Some(object) = event.as_object() else {
        return Err("Publish event must be a JSON object".to_string());
    };

    let Some(body) = object.get("body") else {
        return Ok(event);
    };

    match body {
        Value::Object(_) => Ok(body.clone()),
        Value::String(text) => {
            serde_json::from_str(text).map_err(|error| format!("Malformed JSON body: {error}"))
        }
        _ => Err("Request body must be a JSON object".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use sns_notify_core::test_helpers::{fake_topic_arn, RecordingTopicService};
    use sns_notify_core::NotificationConfig;

    use super::*;

    const PUBLISHED_AT: &str = "2026-02-14T10:00:00+00:00";

    fn template(service: &RecordingTopicService) -> NotificationTemplate<&RecordingTopicService> {
        NotificationTemplate::from_config(
            service,
            &NotificationConfig {
                default_destination: Some("alerts".to_string()),
                auto_create_topics: false,
            },
        )
    }

    #[test]
    fn publishes_text_message_with_headers_and_subject() {
        let service = RecordingTopicService::new().with_topics([fake_topic_arn("orders")]);
        let response = handle_publish_event(
            &template(&service),
            json!({
                "destination": "orders",
                "message": "Order 42 shipped",
                "subject": "Shipping update",
                "headers": {"tenant": "acme", "priority": 2, "flags": {"x": true}}
            }),
            PUBLISHED_AT,
        )
        .expect("publish succeeds");

        assert_eq!(response.status, "published");
        assert_eq!(response.topic_arn, fake_topic_arn("orders"));
        assert_eq!(response.message_id.as_deref(), Some("message-1"));
        assert_eq!(response.published_at, PUBLISHED_AT);

        let request = &service.published()[0];
        assert_eq!(request.message, "Order 42 shipped");
        assert_eq!(request.subject.as_deref(), Some("Shipping update"));
        assert_eq!(request.message_attributes["priority"].data_type, "Number");
        assert!(!request.message_attributes.contains_key("flags"));
    }

    #[test]
    fn falls_back_to_default_destination() {
        let service = RecordingTopicService::new().with_topics([fake_topic_arn("alerts")]);
        let response = handle_publish_event(
            &template(&service),
            json!({"body": "{\"message\": \"disk full\"}"}),
            PUBLISHED_AT,
        )
        .expect("publish succeeds");

        assert_eq!(response.topic_arn, fake_topic_arn("alerts"));
    }

    #[test]
    fn rejects_structured_message_without_calls() {
        let service = RecordingTopicService::new().with_topics([fake_topic_arn("alerts")]);
        let error = handle_publish_event(
            &template(&service),
            json!({"message": ["A payload"]}),
            PUBLISHED_AT,
        )
        .expect_err("array payload should be rejected");

        assert_eq!(error.error_code, "invalid_argument");
        assert!(service.calls().is_empty());
    }

    #[test]
    fn reports_unresolved_destination() {
        let service = RecordingTopicService::new().with_topics([fake_topic_arn("alerts")]);
        let error = handle_publish_event(
            &template(&service),
            json!({"destination": "missing", "message": "hi"}),
            PUBLISHED_AT,
        )
        .expect_err("unknown topic should fail");

        assert_eq!(error.error_code, "unresolved_destination");
        assert_eq!(
            error.to_json(),
            json!({
                "error": "unresolved_destination",
                "message": "no topic found for destination 'missing'",
            })
        );
    }

    #[test]
    fn rejects_event_without_message() {
        let service = RecordingTopicService::new();
        let error = handle_publish_event(
            &template(&service),
            json!({"destination": "orders"}),
            PUBLISHED_AT,
        )
        .expect_err("message is required");

        assert_eq!(error.error_code, "malformed_event");
        assert!(error.message.contains("Malformed event"));
    }

    #[test]
    fn rejects_non_object_events() {
        let service = RecordingTopicService::new();
        let error = handle_publish_event(&template(&service), json!("hello"), PUBLISHED_AT)
            .expect_err("string event should fail");

        assert_eq!(error.message, "Publish event must be a JSON object");
    }
}
