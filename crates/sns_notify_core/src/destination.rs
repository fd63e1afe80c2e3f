//! Destination names and their resolution to topic ARNs.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::contract::TopicService;
use crate::error::NotificationError;

/// True when `destination` is already a provider identifier.
pub fn is_topic_arn(destination: &str) -> bool {
    destination
        .get(..4)
        .map(|prefix| prefix.eq_ignore_ascii_case("arn:"))
        .unwrap_or(false)
}

/// Topic name of an ARN: the text after its last `:` or `/`.
pub fn topic_name(arn: &str) -> &str {
    arn.rsplit(|c: char| c == ':' || c == '/').next().unwrap_or(arn)
}

/// Resolves logical topic names to ARNs, caching each answer for the
/// resolver's lifetime.
///
/// Names are assumed to map to the same ARN for the life of the process, so
/// entries are never invalidated. Two threads racing on the same name may
/// both hit the provider; the first insert wins and both get the same ARN.
#[derive(Debug, Default)]
pub struct TopicResolver {
    cache: RwLock<HashMap<String, String>>,
    auto_create: bool,
}

impl TopicResolver {
    pub fn new(auto_create: bool) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            auto_create,
        }
    }

    pub fn auto_create(&self) -> bool {
        self.auto_create
    }

    pub fn cached(&self, name: &str) -> Option<String> {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn resolve<S: TopicService + ?Sized>(
        &self,
        service: &S,
        destination: &str,
    ) -> Result<String, NotificationError<S::Error>> {
        if is_topic_arn(destination) {
            return Ok(destination.to_string());
        }

        if let Some(arn) = self.cached(destination) {
            tracing::debug!(destination, topic_arn = %arn, "destination cache hit");
            return Ok(arn);
        }

        let arn = if self.auto_create {
            tracing::debug!(destination, "creating topic");
            service
                .create_topic(destination)
                .map_err(NotificationError::Provider)?
        } else {
            find_topic(service, destination)?
        };

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        Ok(cache.entry(destination.to_string()).or_insert(arn).clone())
    }
}

fn find_topic<S: TopicService + ?Sized>(
    service: &S,
    name: &str,
) -> Result<String, NotificationError<S::Error>> {
    let mut next_token: Option<String> = None;
    let mut pages = 0usize;
    loop {
        let page = service
            .list_topics(next_token.as_deref())
            .map_err(NotificationError::Provider)?;
        pages += 1;
        tracing::debug!(
            destination = name,
            page = pages,
            topics = page.topic_arns.len(),
            "listed topics"
        );

        if let Some(arn) = page
            .topic_arns
            .into_iter()
            .find(|arn| topic_name(arn) == name)
        {
            return Ok(arn);
        }

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => return Err(NotificationError::UnresolvedDestination(name.to_string())),
        }
    }
}
