//! AWS authentication for sqskit
//!
//! Implements AWS Signature Version 2 (HmacSHA256) for query API requests.

pub mod sigv2;

pub use sigv2::{compute_signature, RequestSigner, SignError, SignatureV2, SignedRequest};
