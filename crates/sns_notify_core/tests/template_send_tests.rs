use serde_json::json;
use sns_notify_core::contract::TopicPage;
use sns_notify_core::message::{TextMessage, CONTENT_TYPE_HEADER, TEXT_PLAIN_UTF8};
use sns_notify_core::test_helpers::{fake_topic_arn, RecordingTopicService, TopicCall};
use sns_notify_core::{
    ErrorKind, HeaderValue, Message, MessageHeaders, NotificationConfig, NotificationError,
    NotificationTemplate, SendOptions,
};

const PHYSICAL_TOPIC: &str = "arn:aws:sns:eu-west:123456789012:test";

fn template_for(
    service: &RecordingTopicService,
) -> NotificationTemplate<&RecordingTopicService> {
    NotificationTemplate::new(service)
}

#[test]
fn send_uses_default_arn_without_listing() {
    let service = RecordingTopicService::new().with_topics([PHYSICAL_TOPIC]);
    let template = NotificationTemplate::new(&service).with_default_destination(PHYSICAL_TOPIC);

    let receipt = template
        .send(Message::new("Message content").with_header("tenant", "acme"))
        .expect("send succeeds");

    assert_eq!(receipt.topic_arn, PHYSICAL_TOPIC);
    assert_eq!(service.list_calls(), 0);
    let published = service.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic_arn, PHYSICAL_TOPIC);
    assert_eq!(published[0].message, "Message content");
    assert_eq!(published[0].subject, None);
    assert_eq!(
        published[0].message_attributes["tenant"]
            .string_value
            .as_deref(),
        Some("acme")
    );
}

#[test]
fn send_notification_to_sets_subject_and_body() {
    let service = RecordingTopicService::new().with_topics([PHYSICAL_TOPIC]);
    let template = template_for(&service);

    template
        .send_notification_to(PHYSICAL_TOPIC, "My message", "My subject")
        .expect("send succeeds");

    let published = service.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic_arn, PHYSICAL_TOPIC);
    assert_eq!(published[0].message, "My message");
    assert_eq!(published[0].subject.as_deref(), Some("My subject"));
    assert_eq!(
        published[0].message_attributes[CONTENT_TYPE_HEADER]
            .string_value
            .as_deref(),
        Some(TEXT_PLAIN_UTF8)
    );
}

#[test]
fn send_notification_uses_default_destination() {
    let service = RecordingTopicService::new().with_topics([PHYSICAL_TOPIC]);
    let template = NotificationTemplate::new(&service).with_default_destination(PHYSICAL_TOPIC);

    template
        .send_notification("My message", "My subject")
        .expect("send succeeds");

    let published = service.published();
    assert_eq!(published[0].topic_arn, PHYSICAL_TOPIC);
    assert_eq!(published[0].subject.as_deref(), Some("My subject"));
}

#[test]
fn logical_name_resolves_through_listing() {
    let service = RecordingTopicService::new().with_topics([
        "arn:aws:sns:eu-west:123456789012:other",
        PHYSICAL_TOPIC,
    ]);
    let template = template_for(&service);

    template
        .send_to("test", Message::new("hello"))
        .expect("send succeeds");

    assert_eq!(service.list_calls(), 1);
    assert_eq!(service.published()[0].topic_arn, PHYSICAL_TOPIC);
}

#[test]
fn resolution_follows_listing_pages() {
    let service = RecordingTopicService::new().with_pages(vec![
        TopicPage {
            topic_arns: vec![fake_topic_arn("first")],
            next_token: Some("page-2".to_string()),
        },
        TopicPage {
            topic_arns: vec![fake_topic_arn("orders")],
            next_token: None,
        },
    ]);
    let template = template_for(&service);

    let arn = template
        .resolve_destination("orders")
        .expect("second page has the topic");

    assert_eq!(arn, fake_topic_arn("orders"));
    assert_eq!(
        service.calls(),
        vec![
            TopicCall::ListTopics { next_token: None },
            TopicCall::ListTopics {
                next_token: Some("page-2".to_string())
            },
        ]
    );
}

#[test]
fn repeated_resolution_lists_once() {
    let service = RecordingTopicService::new().with_topics([PHYSICAL_TOPIC]);
    let template = template_for(&service);

    let first = template.resolve_destination("test").expect("resolves");
    let second = template.resolve_destination("test").expect("resolves again");

    assert_eq!(first, second);
    assert_eq!(service.list_calls(), 1);
    assert_eq!(template.resolver().cached("test").as_deref(), Some(PHYSICAL_TOPIC));

    template
        .send_to("test", Message::new("one"))
        .expect("send succeeds");
    template
        .send_to("test", Message::new("two"))
        .expect("send succeeds");
    assert_eq!(service.list_calls(), 1);
    assert_eq!(service.published().len(), 2);
}

#[test]
fn unknown_name_fails_resolution() {
    let service =
        RecordingTopicService::new().with_topics(["arn:aws:sns:eu-west:123456789012:my-test"]);
    let template = template_for(&service);

    let error = template
        .send_to("test", Message::new("hello"))
        .expect_err("no topic is named test");

    assert_eq!(error.kind(), ErrorKind::Resolution);
    assert!(service.published().is_empty());
    assert_eq!(template.resolver().cached("test"), None);
}

#[test]
fn auto_create_skips_listing() {
    let service = RecordingTopicService::new();
    let config = NotificationConfig {
        default_destination: None,
        auto_create_topics: true,
    };
    let template = NotificationTemplate::from_config(&service, &config);

    template
        .send_to("orders", Message::new("hello"))
        .expect("send succeeds");
    template
        .send_to("orders", Message::new("again"))
        .expect("send succeeds");

    assert_eq!(service.list_calls(), 0);
    assert_eq!(service.create_calls(), 1);
    assert_eq!(service.published()[1].topic_arn, fake_topic_arn("orders"));
}

#[test]
fn send_without_destination_is_invalid_state() {
    let service = RecordingTopicService::new().with_topics([PHYSICAL_TOPIC]);
    let template = template_for(&service);

    let error = template
        .send(Message::new("hello"))
        .expect_err("no default destination");

    assert_eq!(error.kind(), ErrorKind::InvalidState);
    assert!(matches!(error, NotificationError::MissingDestination));
    assert!(service.calls().is_empty());

    let error = template
        .send_notification("hello", "subject")
        .expect_err("no default destination");
    assert_eq!(error.kind(), ErrorKind::InvalidState);
    assert!(service.calls().is_empty());
}

#[test]
fn convert_and_send_rejects_non_text_payloads_in_every_form() {
    let service = RecordingTopicService::new().with_topics([PHYSICAL_TOPIC]);
    let template = template_for(&service);
    let post_processor = |message: TextMessage| message;
    let headers = MessageHeaders::from([("header".to_string(), HeaderValue::from("value"))]);

    let attempts = vec![
        template.convert_and_send(json!(["A payload"]), SendOptions::new().to("destination")),
        template.convert_and_send(
            json!(["A payload"]),
            SendOptions::new()
                .to("destination")
                .headers(headers.clone()),
        ),
        template.convert_and_send(
            json!(["A payload"]),
            SendOptions::new()
                .to("destination")
                .post_processor(&post_processor),
        ),
        template.convert_and_send(
            json!(["A payload"]),
            SendOptions::new()
                .to("destination")
                .headers(headers)
                .post_processor(&post_processor),
        ),
        template.convert_and_send(vec![1u8, 2, 3], SendOptions::new().to(PHYSICAL_TOPIC)),
        template.convert_and_send(json!({"a": 1}), SendOptions::new()),
    ];

    for attempt in attempts {
        let error = attempt.expect_err("non-text payload must be rejected");
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    }
    assert!(service.calls().is_empty());
}

#[test]
fn provider_errors_pass_through_unchanged() {
    let service = RecordingTopicService::new().fail_publish_with("Rate exceeded");
    let template = NotificationTemplate::new(&service).with_default_destination(PHYSICAL_TOPIC);

    let error = template
        .send(Message::new("hello"))
        .expect_err("publish fails");

    assert_eq!(error.kind(), ErrorKind::Provider);
    assert_eq!(error.to_string(), "Rate exceeded");
    assert_eq!(service.published().len(), 1);
}

#[test]
fn listing_errors_pass_through_unchanged() {
    let service = RecordingTopicService::new().fail_listing_with("AuthorizationError");
    let template = template_for(&service);

    let error = template
        .send_to("test", Message::new("hello"))
        .expect_err("listing fails");

    assert_eq!(
        error.into_provider_error().map(|e| e.0),
        Some("AuthorizationError".to_string())
    );
    assert!(service.published().is_empty());
}
