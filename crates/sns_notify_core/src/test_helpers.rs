//! In-memory topic service for tests.
//!
//! [`RecordingTopicService`] records every call it receives and answers from
//! scripted topic pages. Clones share the same state, so a test can hand one
//! clone to a template and inspect calls through another.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::contract::{PublishReceipt, PublishRequest, TopicPage, TopicService};

pub const FAKE_REGION: &str = "us-east-1";
pub const FAKE_ACCOUNT: &str = "000000000000";

/// Recorded topic service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicCall {
    ListTopics { next_token: Option<String> },
    CreateTopic { name: String },
    Publish(PublishRequest),
}

/// Error produced by [`RecordingTopicService`] when scripted to fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FakeProviderError(pub String);

#[derive(Default)]
struct FakeTopicState {
    pages: Vec<TopicPage>,
    calls: Vec<TopicCall>,
    list_failure: Option<FakeProviderError>,
    publish_failure: Option<FakeProviderError>,
    published_count: usize,
}

#[derive(Clone, Default)]
pub struct RecordingTopicService {
    inner: Arc<Mutex<FakeTopicState>>,
}

/// ARN the fake hands out for a topic name.
pub fn fake_topic_arn(name: &str) -> String {
    format!("arn:aws:sns:{FAKE_REGION}:{FAKE_ACCOUNT}:{name}")
}

impl RecordingTopicService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists `topic_arns` as a single page.
    pub fn with_topics<I, T>(self, topic_arns: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.with_pages(vec![TopicPage {
            topic_arns: topic_arns.into_iter().map(Into::into).collect(),
            next_token: None,
        }])
    }

    /// Serves `pages` in order, chained by each page's `next_token`.
    pub fn with_pages(self, pages: Vec<TopicPage>) -> Self {
        self.state().pages = pages;
        self
    }

    pub fn fail_listing_with(self, message: impl Into<String>) -> Self {
        self.state().list_failure = Some(FakeProviderError(message.into()));
        self
    }

    pub fn fail_publish_with(self, message: impl Into<String>) -> Self {
        self.state().publish_failure = Some(FakeProviderError(message.into()));
        self
    }

    pub fn calls(&self) -> Vec<TopicCall> {
        self.state().calls.clone()
    }

    pub fn published(&self) -> Vec<PublishRequest> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                TopicCall::Publish(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| matches!(call, TopicCall::ListTopics { .. }))
            .count()
    }

    pub fn create_calls(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| matches!(call, TopicCall::CreateTopic { .. }))
            .count()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeTopicState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TopicService for RecordingTopicService {
    type Error = FakeProviderError;

    fn list_topics(&self, next_token: Option<&str>) -> Result<TopicPage, Self::Error> {
        let mut state = self.state();
        state.calls.push(TopicCall::ListTopics {
            next_token: next_token.map(str::to_string),
        });
        if let Some(error) = state.list_failure.clone() {
            return Err(error);
        }

        let index = match next_token {
            None => 0,
            Some(token) => state
                .pages
                .iter()
                .position(|page| page.next_token.as_deref() == Some(token))
                .map(|previous| previous + 1)
                .ok_or_else(|| FakeProviderError(format!("unknown next token '{token}'")))?,
        };
        Ok(state.pages.get(index).cloned().unwrap_or_default())
    }

    fn create_topic(&self, name: &str) -> Result<String, Self::Error> {
        self.state().calls.push(TopicCall::CreateTopic {
            name: name.to_string(),
        });
        Ok(fake_topic_arn(name))
    }

    fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt, Self::Error> {
        let mut state = self.state();
        state.calls.push(TopicCall::Publish(request.clone()));
        if let Some(error) = state.publish_failure.clone() {
            return Err(error);
        }

        state.published_count += 1;
        Ok(PublishReceipt {
            topic_arn: request.topic_arn.clone(),
            message_id: Some(format!("message-{}", state.published_count)),
        })
    }
}
