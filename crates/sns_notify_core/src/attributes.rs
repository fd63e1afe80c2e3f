use crate::contract::{MessageAttributeValue, MessageAttributes};
use crate::message::{HeaderValue, MessageHeaders, NOTIFICATION_SUBJECT_HEADER};

/// Maps message headers to topic message attributes.
///
/// Text, number and binary headers are forwarded with the matching data type.
/// Structured JSON headers have no attribute representation and are skipped.
/// The subject header travels in the request's subject field instead.
pub fn message_attributes(headers: &MessageHeaders) -> MessageAttributes {
    let mut attributes = MessageAttributes::new();
    for (name, value) in headers {
        if name == NOTIFICATION_SUBJECT_HEADER {
            continue;
        }
        let attribute = match value {
            HeaderValue::Text(text) => MessageAttributeValue::string(text.as_str()),
            HeaderValue::Number(number) => MessageAttributeValue::number(number.as_str()),
            HeaderValue::Binary(bytes) => MessageAttributeValue::binary(bytes.as_slice()),
            HeaderValue::Json(_) => {
                tracing::warn!(header = %name, "header type has no message attribute mapping, skipping");
                continue;
            }
        };
        attributes.insert(name.clone(), attribute);
    }
    attributes
}
