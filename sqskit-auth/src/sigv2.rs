//! AWS Signature Version 2 implementation

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::Sha256;
use sqskit_core::{ActionCall, Params};
use thiserror::Error;
use tracing::debug;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Query API version the signed requests are bound to
pub const API_VERSION: &str = "2011-10-01";
pub const SIGNATURE_METHOD: &str = "HmacSHA256";
pub const SIGNATURE_VERSION: &str = "2";

/// Default lifetime of a signature
pub const DEFAULT_EXPIRY_SECS: i64 = 5;

/// Everything except ASCII alphanumerics and `-_.` is escaped; space becomes `+`
const FORM: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Errors during request signing
#[derive(Debug, Error)]
pub enum SignError {
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Endpoint URL has no host: {0}")]
    MissingHost(String),
}

/// A request ready for dispatch
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// Sorted by key, `Signature` included
    pub params: Vec<(String, String)>,
}

impl SignedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn signature(&self) -> Option<&str> {
        self.param("Signature")
    }

    /// Form encoded parameters, used as the POST body or GET query string
    pub fn encoded_params(&self) -> String {
        encode_query(&self.params)
    }
}

/// Signs action calls for dispatch
pub trait RequestSigner: Send + Sync {
    /// Sign `call` against the resolved endpoint `url`, valid until `expires`
    fn sign(
        &self,
        call: &ActionCall,
        url: &str,
        expires: DateTime<Utc>,
    ) -> Result<SignedRequest, SignError>;

    /// Sign with the default expiry of now + 5 seconds
    fn sign_now(&self, call: &ActionCall, url: &str) -> Result<SignedRequest, SignError> {
        self.sign(call, url, Utc::now() + Duration::seconds(DEFAULT_EXPIRY_SECS))
    }
}

/// HmacSHA256 signature version 2 signer
#[derive(Clone)]
pub struct SignatureV2 {
    access_key: String,
    secret_key: String,
}

impl std::fmt::Debug for SignatureV2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureV2")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl SignatureV2 {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }
}

impl RequestSigner for SignatureV2 {
    fn sign(
        &self,
        call: &ActionCall,
        url: &str,
        expires: DateTime<Utc>,
    ) -> Result<SignedRequest, SignError> {
        let parsed = Url::parse(url)?;
        let host = parsed
            .host_str()
            .ok_or_else(|| SignError::MissingHost(url.to_string()))?;

        let mut params: Params = call.params.clone();
        params.insert("AWSAccessKeyId", self.access_key.as_str());
        params.insert("Version", API_VERSION);
        params.insert("Expires", format_expires(expires));
        params.insert("SignatureMethod", SIGNATURE_METHOD);
        params.insert("SignatureVersion", SIGNATURE_VERSION);
        params.remove("Signature");

        let mut headers = HeaderMap::new();
        if call.method == Method::POST {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }

        let mut pairs = params.to_pairs();
        let canonical = canonical_string(&call.method, host, parsed.path(), &pairs);
        let signature = compute_signature(self.secret_key.as_bytes(), canonical.as_bytes());

        debug!(action = %call.action, host = %host, "Signed request");

        pairs.push(("Signature".to_string(), signature));
        pairs.sort_by(|(a, _), (b, _)| a.cmp(b));

        Ok(SignedRequest {
            method: call.method.clone(),
            url: url.to_string(),
            headers,
            params: pairs,
        })
    }
}

/// `Expires` timestamp, UTC with a literal `Z`
pub fn format_expires(expires: DateTime<Utc>) -> String {
    expires.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Form encode a single key or value
fn form_encode(s: &str) -> String {
    utf8_percent_encode(s, FORM).to_string().replace("%20", "+")
}

/// Encode sorted pairs as an `x-www-form-urlencoded` query string
pub fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Create the string the signature is computed over
///
/// Format: METHOD\nhost\npath\nquery
pub fn canonical_string(
    method: &Method,
    host: &str,
    path: &str,
    sorted_params: &[(String, String)],
) -> String {
    let path = if path.is_empty() { "/" } else { path };

    format!(
        "{}\n{}\n{}\n{}",
        method.as_str().to_uppercase(),
        host.to_lowercase(),
        path,
        encode_query(sorted_params)
    )
}

/// HMAC-SHA256 keyed with the raw secret, base64 encoded
pub fn compute_signature(key: &[u8], data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    STANDARD.encode(mac.finalize().into_bytes())
}
