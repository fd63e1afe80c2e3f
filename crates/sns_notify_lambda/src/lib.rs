//! AWS-oriented adapters and handlers for topic notifications.
//!
//! This crate owns runtime integration details (the SNS client adapter and the
//! publish Lambda handler). Message validation, attribute mapping and topic
//! resolution stay in `sns_notify_core`.

pub mod adapters;
pub mod handlers;
