//! HTTP transport

use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use sqskit_auth::SignedRequest;
use tracing::debug;

use crate::error::TransportError;

/// Status and body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Dispatches signed requests
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: SignedRequest) -> Result<RawResponse, TransportError>;
}

/// `reqwest` backed transport
///
/// POST requests carry the parameters as a form body, everything else as the
/// query string.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: SignedRequest) -> Result<RawResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|_| TransportError::InvalidMethod(request.method.to_string()))?;
        let encoded = request.encoded_params();

        let mut builder = if request.method == Method::POST {
            self.client.request(method, &request.url).body(encoded)
        } else {
            let separator = if request.url.contains('?') { '&' } else { '?' };
            self.client
                .request(method, format!("{}{}{}", request.url, separator, encoded))
        };

        for (name, value) in &request.headers {
            if let Ok(value) = value.to_str() {
                builder = builder.header(name.as_str(), value);
            }
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(url = %request.url, status, bytes = body.len(), "Received response");

        Ok(RawResponse { status, body })
    }
}
