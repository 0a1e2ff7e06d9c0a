//! Core types for sqskit
//!
//! This crate provides the types shared by the signer and the SQS client:
//! the typed action parameters, the parsed XML response tree and the
//! service error carried inside a response envelope.

pub mod error;
pub mod params;
pub mod xml;

pub use error::ServiceError;
pub use params::{ActionCall, ParamValue, Params};
pub use xml::{Node, XmlError};
