use std::collections::HashMap;
use std::future::Future;

use aws_sdk_sns::error::{BuildError, SdkError};
use aws_sdk_sns::operation::create_topic::CreateTopicError;
use aws_sdk_sns::operation::list_topics::ListTopicsError;
use aws_sdk_sns::operation::publish::PublishError;
use aws_sdk_sns::primitives::Blob;
use aws_sdk_sns::types::MessageAttributeValue as SnsMessageAttributeValue;
use sns_notify_core::contract::{
    MessageAttributes, PublishReceipt, PublishRequest, TopicPage, TopicService,
};
use thiserror::Error;

/// Failures of the SNS adapter. SDK errors are carried as returned.
#[derive(Debug, Error)]
pub enum SnsServiceError {
    #[error(transparent)]
    ListTopics(#[from] SdkError<ListTopicsError>),
    #[error(transparent)]
    CreateTopic(#[from] SdkError<CreateTopicError>),
    #[error(transparent)]
    Publish(#[from] SdkError<PublishError>),
    #[error("invalid message attribute: {0}")]
    Attribute(#[from] BuildError),
    #[error("create_topic returned no topic ARN for '{0}'")]
    MissingTopicArn(String),
}

/// [`TopicService`] backed by the AWS SNS SDK.
///
/// The SDK is async; calls block the current worker with `block_in_place`,
/// so this must run on a multi-threaded tokio runtime.
#[derive(Debug, Clone)]
pub struct SnsTopicService {
    client: aws_sdk_sns::Client,
}

impl SnsTopicService {
    pub fn new(client: aws_sdk_sns::Client) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_sns::Client::new(&config))
    }
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

impl TopicService for SnsTopicService {
    type Error = SnsServiceError;

    fn list_topics(&self, next_token: Option<&str>) -> Result<TopicPage, Self::Error> {
        let request = self
            .client
            .list_topics()
            .set_next_token(next_token.map(str::to_string));

        let output = block_on(request.send())?;
        Ok(TopicPage {
            topic_arns: output
                .topics()
                .iter()
                .filter_map(|topic| topic.topic_arn().map(str::to_string))
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    fn create_topic(&self, name: &str) -> Result<String, Self::Error> {
        let request = self.client.create_topic().name(name);

        let output = block_on(request.send())?;
        output
            .topic_arn()
            .map(str::to_string)
            .ok_or_else(|| SnsServiceError::MissingTopicArn(name.to_string()))
    }

    fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt, Self::Error> {
        let attributes = sdk_message_attributes(&request.message_attributes)?;
        let call = self
            .client
            .publish()
            .topic_arn(request.topic_arn.as_str())
            .message(request.message.as_str())
            .set_subject(request.subject.clone())
            .set_message_attributes((!attributes.is_empty()).then_some(attributes));

        let output = block_on(call.send())?;
        Ok(PublishReceipt {
            topic_arn: request.topic_arn.clone(),
            message_id: output.message_id().map(str::to_string),
        })
    }
}

/// Converts message attributes to their SDK representation.
pub fn sdk_message_attributes(
    attributes: &MessageAttributes,
) -> Result<HashMap<String, SnsMessageAttributeValue>, BuildError> {
    attributes
        .iter()
        .map(|(name, value)| {
            let attribute = SnsMessageAttributeValue::builder()
                .data_type(value.data_type.as_str())
                .set_string_value(value.string_value.clone())
                .set_binary_value(value.binary_value.clone().map(Blob::new))
                .build()?;
            Ok((name.clone(), attribute))
        })
        .collect()
}
