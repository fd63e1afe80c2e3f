use thiserror::Error;

use crate::message::PayloadKind;

/// Coarse classification of a [`NotificationError`], independent of the
/// provider error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidState,
    Resolution,
    Provider,
}

/// Rejection of a payload that cannot be published as a text message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payload must be text to be published to a topic, got {kind}")]
pub struct ConversionError {
    kind: PayloadKind,
}

impl ConversionError {
    pub fn new(kind: PayloadKind) -> Self {
        Self { kind }
    }

    pub fn payload_kind(&self) -> PayloadKind {
        self.kind
    }
}

/// Errors returned by the notification template.
///
/// `E` is the topic service's own error type. Provider failures are carried
/// in [`NotificationError::Provider`] exactly as the service returned them.
#[derive(Debug, Error)]
pub enum NotificationError<E> {
    #[error(transparent)]
    InvalidArgument(ConversionError),
    #[error("no destination given and no default destination configured")]
    MissingDestination,
    #[error("no topic found for destination '{0}'")]
    UnresolvedDestination(String),
    #[error(transparent)]
    Provider(E),
}

impl<E> NotificationError<E> {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::MissingDestination => ErrorKind::InvalidState,
            Self::UnresolvedDestination(_) => ErrorKind::Resolution,
            Self::Provider(_) => ErrorKind::Provider,
        }
    }

    /// The provider error, if this failure came from the topic service.
    pub fn provider_error(&self) -> Option<&E> {
        match self {
            Self::Provider(error) => Some(error),
            _ => None,
        }
    }

    pub fn into_provider_error(self) -> Option<E> {
        match self {
            Self::Provider(error) => Some(error),
            _ => None,
        }
    }
}

impl<E> From<ConversionError> for NotificationError<E> {
    fn from(error: ConversionError) -> Self {
        Self::InvalidArgument(error)
    }
}

/// Errors raised while loading [`crate::config::NotificationConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be one of true/false/1/0, got '{value}'")]
    InvalidFlag { name: String, value: String },
}
