//! The notification template: validate, map and publish.

use crate::attributes::message_attributes;
use crate::config::NotificationConfig;
use crate::contract::{PublishReceipt, PublishRequest, TopicService};
use crate::destination::TopicResolver;
use crate::error::NotificationError;
use crate::message::{HeaderValue, Message, MessageHeaders, Payload, TextMessage};

/// Hook applied to a converted message right before it is published.
pub trait MessagePostProcessor {
    fn post_process(&self, message: TextMessage) -> TextMessage;
}

impl<F> MessagePostProcessor for F
where
    F: Fn(TextMessage) -> TextMessage,
{
    fn post_process(&self, message: TextMessage) -> TextMessage {
        self(message)
    }
}

/// Options for [`NotificationTemplate::convert_and_send`]. Absent fields fall
/// back to the template defaults.
#[derive(Default)]
pub struct SendOptions<'a> {
    pub destination: Option<String>,
    pub subject: Option<String>,
    pub headers: MessageHeaders,
    pub post_processor: Option<&'a dyn MessagePostProcessor>,
}

impl<'a> SendOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: MessageHeaders) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn post_processor(mut self, post_processor: &'a dyn MessagePostProcessor) -> Self {
        self.post_processor = Some(post_processor);
        self
    }
}

/// Publishes text messages to topics through a [`TopicService`].
///
/// Destinations are topic ARNs or logical topic names; names are resolved
/// once and cached for the life of the template.
pub struct NotificationTemplate<S> {
    service: S,
    resolver: TopicResolver,
    default_destination: Option<String>,
}

impl<S: TopicService> NotificationTemplate<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            resolver: TopicResolver::new(false),
            default_destination: None,
        }
    }

    pub fn from_config(service: S, config: &NotificationConfig) -> Self {
        Self {
            service,
            resolver: TopicResolver::new(config.auto_create_topics),
            default_destination: config.default_destination.clone(),
        }
    }

    pub fn with_default_destination(mut self, destination: impl Into<String>) -> Self {
        self.set_default_destination(destination);
        self
    }

    pub fn set_default_destination(&mut self, destination: impl Into<String>) {
        self.default_destination = Some(destination.into());
    }

    pub fn default_destination(&self) -> Option<&str> {
        self.default_destination.as_deref()
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn resolver(&self) -> &TopicResolver {
        &self.resolver
    }

    /// Sends `message` to the default destination.
    pub fn send(&self, message: Message) -> Result<PublishReceipt, NotificationError<S::Error>> {
        let message = message.into_text()?;
        let destination = self.required_default_destination()?;
        self.publish(destination, message)
    }

    pub fn send_to(
        &self,
        destination: &str,
        message: Message,
    ) -> Result<PublishReceipt, NotificationError<S::Error>> {
        let message = message.into_text()?;
        self.publish(destination, message)
    }

    /// Sends `text` with `subject` to the default destination.
    pub fn send_notification(
        &self,
        text: impl Into<String>,
        subject: impl Into<String>,
    ) -> Result<PublishReceipt, NotificationError<S::Error>> {
        self.convert_and_send(
            Payload::Text(text.into()),
            SendOptions::new().subject(subject),
        )
    }

    pub fn send_notification_to(
        &self,
        destination: &str,
        text: impl Into<String>,
        subject: impl Into<String>,
    ) -> Result<PublishReceipt, NotificationError<S::Error>> {
        self.convert_and_send(
            Payload::Text(text.into()),
            SendOptions::new().to(destination).subject(subject),
        )
    }

    /// Converts `payload` to a text message and publishes it.
    ///
    /// Non-text payloads are rejected before the destination is looked at,
    /// so a rejected call never touches the topic service.
    pub fn convert_and_send(
        &self,
        payload: impl Into<Payload>,
        options: SendOptions<'_>,
    ) -> Result<PublishReceipt, NotificationError<S::Error>> {
        let SendOptions {
            destination,
            subject,
            headers,
            post_processor,
        } = options;

        let mut message = TextMessage::convert(payload.into(), headers)?;
        message.subject = subject;

        let destination = match destination.as_deref() {
            Some(destination) => destination,
            None => self.required_default_destination()?,
        };

        if let Some(post_processor) = post_processor {
            message = post_processor.post_process(message);
        }

        self.publish(destination, message)
    }

    /// Resolves a destination name to a topic ARN, using the cache when possible.
    pub fn resolve_destination(
        &self,
        destination: &str,
    ) -> Result<String, NotificationError<S::Error>> {
        self.resolver.resolve(&self.service, destination)
    }

    fn required_default_destination(&self) -> Result<&str, NotificationError<S::Error>> {
        self.default_destination
            .as_deref()
            .ok_or(NotificationError::MissingDestination)
    }

    fn publish(
        &self,
        destination: &str,
        message: TextMessage,
    ) -> Result<PublishReceipt, NotificationError<S::Error>> {
        let topic_arn = self.resolve_destination(destination)?;
        let request = PublishRequest {
            subject: message.effective_subject().map(str::to_string),
            message_attributes: message_attributes(&message.headers),
            topic_arn,
            message: message.body,
        };

        tracing::info!(
            topic_arn = %request.topic_arn,
            attributes = request.message_attributes.len(),
            has_subject = request.subject.is_some(),
            "publishing notification"
        );
        let receipt = self
            .service
            .publish(&request)
            .map_err(NotificationError::Provider)?;
        tracing::debug!(message_id = ?receipt.message_id, "notification published");
        Ok(receipt)
    }
}
