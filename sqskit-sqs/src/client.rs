//! Protocol client: sign, dispatch and interpret action calls

use async_trait::async_trait;
use sqskit_auth::RequestSigner;
use sqskit_core::{xml, ActionCall, Node, ServiceError};
use tracing::{debug, warn};

use crate::error::{SqsError, TransportError};
use crate::transport::{RawResponse, Transport};

/// Interpreted response to an action call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// The call succeeded without a `{Action}Result` payload
    Ack(bool),
    /// Content of the `{Action}Result` element
    Fields(Node),
}

impl ActionResult {
    /// Acks are truthy when true, payloads when non-empty
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Ack(ok) => *ok,
            Self::Fields(node) => !node.is_empty(),
        }
    }

    pub fn fields(&self) -> Option<&Node> {
        match self {
            Self::Fields(node) => Some(node),
            Self::Ack(_) => None,
        }
    }

    /// Field of the result payload
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.fields().and_then(|node| node.get(key))
    }

    pub fn text_of(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_text)
    }
}

/// Issues action calls against the service
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    async fn call(&self, call: ActionCall) -> Result<ActionResult, SqsError>;
}

/// Signing client over a [`Transport`]
pub struct Client<T, S> {
    endpoint: String,
    transport: T,
    signer: S,
}

impl<T: Transport, S: RequestSigner> Client<T, S> {
    /// `endpoint` is used for calls that carry no target URL
    pub fn new(endpoint: impl Into<String>, transport: T, signer: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            signer,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl<T: Transport, S: RequestSigner> ProtocolClient for Client<T, S> {
    async fn call(&self, mut call: ActionCall) -> Result<ActionResult, SqsError> {
        let url = call.target.clone().unwrap_or_else(|| self.endpoint.clone());
        call.params.insert("Action", call.action.clone());

        let request = self.signer.sign_now(&call, &url)?;
        debug!(action = %call.action, url = %url, "Dispatching action");

        let response = self.transport.send(request).await?;
        interpret(&call.action, response)
    }
}

/// Map a raw response onto the result of `action`
///
/// An `<Error>` element always wins. Otherwise the `{action}Result` element is
/// returned, and a response without one acknowledges the call.
pub fn interpret(action: &str, response: RawResponse) -> Result<ActionResult, SqsError> {
    let root = match xml::parse(&response.body) {
        Ok(root) => root,
        Err(_) if !response.is_success() => {
            return Err(TransportError::Status {
                status: response.status,
                body: response.body,
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(error) = ServiceError::from_envelope(&root) {
        warn!(
            action = %action,
            code = %error.code,
            request_id = ?error.request_id,
            "Service returned an error"
        );
        return Err(error.into());
    }

    if !response.is_success() {
        return Err(TransportError::Status {
            status: response.status,
            body: response.body,
        }
        .into());
    }

    let key = format!("{action}Result");
    match root {
        Node::Map(mut children) => match children.remove(&key) {
            Some(result) => Ok(ActionResult::Fields(result)),
            None => Ok(ActionResult::Ack(true)),
        },
        _ => Ok(ActionResult::Ack(true)),
    }
}
