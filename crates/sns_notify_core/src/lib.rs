//! Topic notification messaging primitives.
//!
//! This crate owns message validation, header to attribute mapping, topic
//! name resolution and the notification template. It intentionally excludes
//! AWS SDK and Lambda runtime concerns; those live in `sns_notify_lambda`
//! behind the [`contract::TopicService`] trait.

pub mod attributes;
pub mod config;
pub mod contract;
pub mod destination;
pub mod error;
pub mod message;
pub mod template;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::NotificationConfig;
pub use contract::{
    MessageAttributeValue, PublishReceipt, PublishRequest, TopicPage, TopicService,
};
pub use error::{ErrorKind, NotificationError};
pub use message::{HeaderValue, Message, MessageHeaders, Payload, TextMessage};
pub use template::{MessagePostProcessor, NotificationTemplate, SendOptions};
