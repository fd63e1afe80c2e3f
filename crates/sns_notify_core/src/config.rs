use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_TOPIC_ENV: &str = "SNS_DEFAULT_TOPIC";
pub const AUTO_CREATE_TOPICS_ENV: &str = "SNS_AUTO_CREATE_TOPICS";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Topic name or ARN used when a send names no destination.
    #[serde(default)]
    pub default_destination: Option<String>,
    /// Create missing topics instead of failing resolution.
    #[serde(default)]
    pub auto_create_topics: bool,
}

impl NotificationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default_destination = lookup(DEFAULT_TOPIC_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let auto_create_topics = match lookup(AUTO_CREATE_TOPICS_ENV) {
            Some(value) => parse_flag(AUTO_CREATE_TOPICS_ENV, &value)?,
            None => false,
        };

        Ok(Self {
            default_destination,
            auto_create_topics,
        })
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
