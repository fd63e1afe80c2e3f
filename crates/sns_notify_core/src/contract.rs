use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DATA_TYPE_STRING: &str = "String";
pub const DATA_TYPE_NUMBER: &str = "Number";
pub const DATA_TYPE_BINARY: &str = "Binary";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageAttributeValue {
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_value: Option<Vec<u8>>,
}

impl MessageAttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: DATA_TYPE_STRING.to_string(),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    pub fn number(value: impl Into<String>) -> Self {
        Self {
            data_type: DATA_TYPE_NUMBER.to_string(),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Self {
            data_type: DATA_TYPE_BINARY.to_string(),
            string_value: None,
            binary_value: Some(value.into()),
        }
    }
}

pub type MessageAttributes = BTreeMap<String, MessageAttributeValue>;

/// Provider-neutral publish call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishRequest {
    pub topic_arn: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub message_attributes: MessageAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishReceipt {
    pub topic_arn: String,
    pub message_id: Option<String>,
}

/// One page of a topic listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopicPage {
    pub topic_arns: Vec<String>,
    pub next_token: Option<String>,
}

/// Client for the topic service the template publishes to.
///
/// Calls block until the provider answers. Errors are returned as the
/// provider produced them; the template never retries or rewrites them.
pub trait TopicService {
    type Error: std::error::Error + Send + Sync + 'static;

    fn list_topics(&self, next_token: Option<&str>) -> Result<TopicPage, Self::Error>;

    /// Creates the topic, or returns the existing ARN if it already exists.
    fn create_topic(&self, name: &str) -> Result<String, Self::Error>;

    fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt, Self::Error>;
}

impl<T: TopicService + ?Sized> TopicService for &T {
    type Error = T::Error;

    fn list_topics(&self, next_token: Option<&str>) -> Result<TopicPage, Self::Error> {
        (**self).list_topics(next_token)
    }

    fn create_topic(&self, name: &str) -> Result<String, Self::Error> {
        (**self).create_topic(name)
    }

    fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt, Self::Error> {
        (**self).publish(request)
    }
}
