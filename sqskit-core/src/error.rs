//! Service error carried inside an SQS response envelope

use thiserror::Error;

use crate::xml::Node;

/// Error reported by the remote API in an `<Error>` element
///
/// ```xml
/// <ErrorResponse>
///   <Error>
///     <Type>Sender</Type>
///     <Code>AWS.SimpleQueueService.NonExistentQueue</Code>
///     <Message>The specified queue does not exist.</Message>
///   </Error>
///   <RequestId>42d59b56-7407-4c4a-be0f-4c88daeea257</RequestId>
/// </ErrorResponse>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    pub code: String,
    pub message: String,
    pub error_type: Option<String>,
    pub request_id: Option<String>,
}

impl ServiceError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            error_type: None,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Extract the error from a parsed response root, if it carries one
    pub fn from_envelope(root: &Node) -> Option<Self> {
        let error = root.get("Error")?;

        Some(Self {
            code: error.text_of("Code").unwrap_or("Unknown").to_string(),
            message: error.text_of("Message").unwrap_or_default().to_string(),
            error_type: error.text_of("Type").map(String::from),
            request_id: root.text_of("RequestId").map(String::from),
        })
    }

    /// Whether the service blamed the caller (`Sender`) rather than itself
    pub fn is_sender_fault(&self) -> bool {
        self.error_type.as_deref() == Some("Sender")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml;

    #[test]
    fn test_error_from_envelope() {
        let root = xml::parse(
            r#"<ErrorResponse xmlns="http://queue.amazonaws.com/doc/2011-10-01/">
  <Error>
    <Type>Sender</Type>
    <Code>AWS.SimpleQueueService.NonExistentQueue</Code>
    <Message>The specified queue does not exist.</Message>
    <Detail/>
  </Error>
  <RequestId>req-1</RequestId>
</ErrorResponse>"#,
        )
        .unwrap();

        let error = ServiceError::from_envelope(&root).unwrap();
        assert_eq!(error.code, "AWS.SimpleQueueService.NonExistentQueue");
        assert_eq!(error.message, "The specified queue does not exist.");
        assert_eq!(error.request_id.as_deref(), Some("req-1"));
        assert!(error.is_sender_fault());
        assert_eq!(
            error.to_string(),
            "AWS.SimpleQueueService.NonExistentQueue: The specified queue does not exist."
        );
    }

    #[test]
    fn test_no_error_element() {
        let root = xml::parse("<DeleteQueueResponse><ResponseMetadata><RequestId>x</RequestId></ResponseMetadata></DeleteQueueResponse>").unwrap();
        assert!(ServiceError::from_envelope(&root).is_none());
    }

    #[test]
    fn test_error_without_code() {
        let root = xml::parse("<ErrorResponse><Error><Message>boom</Message></Error></ErrorResponse>").unwrap();
        let error = ServiceError::from_envelope(&root).unwrap();
        assert_eq!(error.code, "Unknown");
        assert_eq!(error.message, "boom");
        assert!(error.request_id.is_none());
    }
}
