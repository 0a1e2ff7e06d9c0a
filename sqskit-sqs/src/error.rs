//! SQS client errors

use sqskit_auth::SignError;
use sqskit_core::{ServiceError, XmlError};
use thiserror::Error;

/// Failures below the protocol layer
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unsupported HTTP method: {0}")]
    InvalidMethod(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum SqsError {
    /// The service answered with an `<Error>` element
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// An update was requested for a queue that is not cached
    #[error("Queue not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Signing error: {0}")]
    Sign(#[from] SignError),

    #[error("Malformed response: {0}")]
    Xml(#[from] XmlError),

    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Unexpected response to {action}: missing {field}")]
    UnexpectedResponse {
        action: &'static str,
        field: &'static str,
    },

    #[error("Queue has no URL")]
    UnboundQueue,

    #[error("Queue has no name")]
    MissingName,

    #[error("Message has no body")]
    MissingBody,

    #[error("Message has no receipt handle")]
    MissingReceiptHandle,
}

impl SqsError {
    /// The service error, if this failure came from the remote API
    pub fn as_service(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(e) => Some(e),
            _ => None,
        }
    }
}
