//! Queue and message entities

use serde::{Deserialize, Serialize};

use crate::error::SqsError;
use crate::mapper::lenient_number;

/// An SQS queue
///
/// Identified by its URL once created; the name never changes after that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Queue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub delay_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub maximum_message_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub message_retention_period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub receive_message_wait_time_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub visibility_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    // Read-only, reported by GetQueueAttributes
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub approximate_number_of_messages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub approximate_number_of_messages_not_visible: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub approximate_number_of_messages_delayed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub created_timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub last_modified_timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_arn: Option<String>,
}

impl Queue {
    /// A local, not yet created queue
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A queue bound to `url`, named after the last path segment
    ///
    /// A URL without a path leaves the queue unnamed.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let name = name_from_url(&url);
        let name = (!name.is_empty()).then(|| name.to_string());
        Self {
            url: Some(url),
            name,
            ..Self::default()
        }
    }

    pub fn is_bound(&self) -> bool {
        self.url.is_some()
    }

    /// The queue URL, required by every queue-scoped call
    pub fn bound_url(&self) -> Result<&str, SqsError> {
        self.url.as_deref().ok_or(SqsError::UnboundQueue)
    }
}

/// Final path segment of a queue URL, empty when the URL has no path
pub fn name_from_url(url: &str) -> &str {
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |start| &rest[start..]),
        None => url,
    };
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}

/// A message sent to or received from a queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5_of_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub sent_timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub approximate_receive_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub approximate_first_receive_timestamp: Option<u64>,

    /// Queue the message was received from
    #[serde(skip)]
    pub queue: Option<Queue>,
}

impl Message {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    /// Only received messages carry a receipt handle and can be deleted
    pub fn can_delete(&self) -> bool {
        self.receipt_handle.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_from_url() {
        let queue = Queue::from_url("http://test.x/blub");
        assert_eq!(queue.url.as_deref(), Some("http://test.x/blub"));
        assert_eq!(queue.name.as_deref(), Some("blub"));
        assert!(queue.is_bound());
    }

    #[test]
    fn test_name_from_url() {
        assert_eq!(
            name_from_url("https://sqs.us-east-1.amazonaws.com/123456789012/orders"),
            "orders"
        );
        assert_eq!(name_from_url("https://host/account/orders/"), "orders");
        assert_eq!(name_from_url("orders"), "orders");
    }

    #[test]
    fn test_url_without_path_has_no_name() {
        assert_eq!(name_from_url("http://test.x/"), "");
        assert_eq!(name_from_url("http://test.x"), "");

        let queue = Queue::from_url("http://test.x/");
        assert_eq!(queue.url.as_deref(), Some("http://test.x/"));
        assert!(queue.name.is_none());
    }

    #[test]
    fn test_unbound_queue() {
        let queue = Queue::named("orders");
        assert!(!queue.is_bound());
        assert!(matches!(queue.bound_url(), Err(SqsError::UnboundQueue)));
    }

    #[test]
    fn test_message_delete_requires_receipt() {
        let mut message = Message::new("hello");
        assert!(!message.can_delete());
        message.receipt_handle = Some("handle".to_string());
        assert!(message.can_delete());
    }
}
