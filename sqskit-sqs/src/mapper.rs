//! Normalize and denormalize entities
//!
//! Entities are exchanged with the rest of the client as flat maps of
//! camelCase field names to string values. The tables below translate between
//! those field names and the attribute names SQS uses on the wire.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqskit_core::Node;

use crate::error::SqsError;

/// Flat field name → string value representation of an entity
pub type Attributes = BTreeMap<String, String>;

/// One row of a field name table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldName {
    pub field: &'static str,
    pub attribute: &'static str,
    /// Whether SetQueueAttributes / CreateQueue accept it
    pub settable: bool,
}

const fn settable(field: &'static str, attribute: &'static str) -> FieldName {
    FieldName { field, attribute, settable: true }
}

const fn read_only(field: &'static str, attribute: &'static str) -> FieldName {
    FieldName { field, attribute, settable: false }
}

pub const QUEUE_FIELDS: &[FieldName] = &[
    settable("delaySeconds", "DelaySeconds"),
    settable("maximumMessageSize", "MaximumMessageSize"),
    settable("messageRetentionPeriod", "MessageRetentionPeriod"),
    settable("policy", "Policy"),
    settable("receiveMessageWaitTimeSeconds", "ReceiveMessageWaitTimeSeconds"),
    settable("visibilityTimeout", "VisibilityTimeout"),
    read_only("approximateNumberOfMessages", "ApproximateNumberOfMessages"),
    read_only("approximateNumberOfMessagesNotVisible", "ApproximateNumberOfMessagesNotVisible"),
    read_only("approximateNumberOfMessagesDelayed", "ApproximateNumberOfMessagesDelayed"),
    read_only("createdTimestamp", "CreatedTimestamp"),
    read_only("lastModifiedTimestamp", "LastModifiedTimestamp"),
    read_only("queueArn", "QueueArn"),
];

pub const MESSAGE_FIELDS: &[FieldName] = &[
    read_only("body", "Body"),
    read_only("messageId", "MessageId"),
    read_only("receiptHandle", "ReceiptHandle"),
    read_only("md5OfBody", "MD5OfBody"),
    read_only("senderId", "SenderId"),
    read_only("sentTimestamp", "SentTimestamp"),
    read_only("approximateReceiveCount", "ApproximateReceiveCount"),
    read_only("approximateFirstReceiveTimestamp", "ApproximateFirstReceiveTimestamp"),
];

/// Wire attribute name for an internal field name
pub fn attribute_name(table: &[FieldName], field: &str) -> Option<&'static str> {
    table.iter().find(|f| f.field == field).map(|f| f.attribute)
}

/// Internal field name for a wire attribute name
///
/// Names missing from the table are lower-camel-cased (`SenderId` → `senderId`).
pub fn field_name(table: &[FieldName], attribute: &str) -> String {
    if let Some(f) = table.iter().find(|f| f.attribute == attribute) {
        return f.field.to_string();
    }

    let mut chars = attribute.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Flatten an entity into field name → string value, skipping unset fields
pub fn normalize<T: Serialize>(entity: &T) -> Result<Attributes, SqsError> {
    let value = serde_json::to_value(entity).map_err(|e| SqsError::Mapping(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(SqsError::Mapping("entity is not a struct".to_string()));
    };

    Ok(fields
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::Null => None,
            Value::String(s) => Some((k, s)),
            other => Some((k, other.to_string())),
        })
        .collect())
}

/// Rebuild an entity from field name → string value
pub fn denormalize<T: DeserializeOwned>(attributes: Attributes) -> Result<T, SqsError> {
    let fields: serde_json::Map<String, Value> = attributes
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    serde_json::from_value(Value::Object(fields)).map_err(|e| SqsError::Mapping(e.to_string()))
}

/// Turn `Attribute` elements of `{Name, Value}` pairs into field name → value
///
/// Accepts a single element or a sequence of them; entries without a name
/// are skipped.
pub fn flatten_attributes(table: &[FieldName], attributes: Option<&Node>) -> Attributes {
    let Some(attributes) = attributes else {
        return Attributes::new();
    };

    attributes
        .items()
        .iter()
        .filter_map(|pair| {
            let name = pair.text_of("Name")?;
            let value = pair.text_of("Value").unwrap_or_default();
            Some((field_name(table, name), value.to_string()))
        })
        .collect()
}

/// Accept numbers given either as JSON numbers or as strings
pub(crate) fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some).map_err(D::Error::custom),
        Some(Value::Number(n)) => n.to_string().parse().map(Some).map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}
