//! Amazon SQS client for sqskit
//!
//! Talks to the 2011-10-01 SQS query API:
//! - ListQueues, GetQueueUrl, CreateQueue, DeleteQueue
//! - GetQueueAttributes, SetQueueAttributes (diff based updates)
//! - SendMessage, ReceiveMessage, DeleteMessage
//!
//! Queues seen by the [`Manager`] are kept in a URL-keyed [`QueueCache`] so
//! that updates only send the attributes that actually changed.

pub mod cache;
pub mod client;
pub mod config;
pub mod differ;
mod error;
pub mod manager;
pub mod mapper;
pub mod model;
pub mod transport;

pub use cache::{QueueCache, QueueStorage};
pub use client::{ActionResult, Client, ProtocolClient};
pub use crate::config::{Config, Endpoint, Region};
pub use differ::{AttributeChange, AttributeDiffer, QueueAttributeDiffer};
pub use error::{SqsError, TransportError};
pub use manager::Manager;
pub use model::{Message, Queue};
pub use transport::{HttpTransport, RawResponse, Transport};
