//! Outgoing message model.
//!
//! A [`Message`] can carry any [`Payload`], but only text can be published to
//! a topic. [`Message::into_text`] and [`TextMessage::convert`] are the single
//! place where that rule is enforced.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::ConversionError;

/// Header set by the converter to describe the payload encoding.
pub const CONTENT_TYPE_HEADER: &str = "contentType";
pub const TEXT_PLAIN_UTF8: &str = "text/plain;charset=UTF-8";
/// Header holding the notification subject. Never forwarded as an attribute.
pub const NOTIFICATION_SUBJECT_HEADER: &str = "NOTIFICATION_SUBJECT_HEADER";

pub type MessageHeaders = BTreeMap<String, HeaderValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Text,
    Binary,
    Json,
}

impl PayloadKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
    Json(Value),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Text(_) => PayloadKind::Text,
            Self::Binary(_) => PayloadKind::Binary,
            Self::Json(_) => PayloadKind::Json,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_text(self) -> Result<String, ConversionError> {
        match self {
            Self::Text(text) => Ok(text),
            other => Err(ConversionError::new(other.kind())),
        }
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

/// JSON strings become text; every other JSON value stays structured.
impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Json(other),
        }
    }
}

/// Typed header value.
///
/// Numbers keep their decimal text so that no precision is lost on the way to
/// the topic service.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Text(String),
    Number(String),
    Binary(Vec<u8>),
    Json(Value),
}

impl HeaderValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        Self::Number(value.to_string())
    }
}

impl From<u64> for HeaderValue {
    fn from(value: u64) -> Self {
        Self::Number(value.to_string())
    }
}

impl From<f64> for HeaderValue {
    fn from(value: f64) -> Self {
        Self::Number(value.to_string())
    }
}

impl From<Vec<u8>> for HeaderValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl From<Value> for HeaderValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Number(number) => Self::Number(number.to_string()),
            other => Self::Json(other),
        }
    }
}

/// A message as handed to the template: any payload, headers, optional subject.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub payload: Payload,
    pub headers: MessageHeaders,
    pub subject: Option<String>,
}

impl Message {
    pub fn new(payload: impl Into<Payload>) -> Self {
        Self {
            payload: payload.into(),
            headers: MessageHeaders::new(),
            subject: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: MessageHeaders) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Checks that the payload is text, keeping headers and subject as they are.
    pub fn into_text(self) -> Result<TextMessage, ConversionError> {
        Ok(TextMessage {
            body: self.payload.into_text()?,
            headers: self.headers,
            subject: self.subject,
        })
    }
}

/// A message whose payload has been validated as text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMessage {
    pub body: String,
    pub headers: MessageHeaders,
    pub subject: Option<String>,
}

impl TextMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            headers: MessageHeaders::new(),
            subject: None,
        }
    }

    /// Converts a raw payload into a text message.
    ///
    /// Non-text payloads are rejected. The content type header is set to
    /// plain UTF-8 text unless the caller already supplied one.
    pub fn convert(payload: Payload, headers: MessageHeaders) -> Result<Self, ConversionError> {
        let body = payload.into_text()?;
        let mut headers = headers;
        headers
            .entry(CONTENT_TYPE_HEADER.to_string())
            .or_insert_with(|| HeaderValue::Text(TEXT_PLAIN_UTF8.to_string()));
        Ok(Self {
            body,
            headers,
            subject: None,
        })
    }

    /// The explicit subject, or the text of the subject header.
    pub fn effective_subject(&self) -> Option<&str> {
        self.subject.as_deref().or_else(|| {
            self.headers
                .get(NOTIFICATION_SUBJECT_HEADER)
                .and_then(HeaderValue::as_text)
        })
    }
}
