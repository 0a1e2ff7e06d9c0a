//! Typed action parameters
//!
//! SQS query actions take flat string parameters. Repeated values use 1-based
//! dot-numbered keys (`Attribute.1.Name`, `AttributeName.1`).

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use http::Method;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

/// Parameter map with unique keys, always iterated in byte-wise key order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.0.iter()
    }

    /// Append `{prefix}.{n}.Name` / `{prefix}.{n}.Value` pairs, numbered from 1
    pub fn push_attributes<I, K, V>(&mut self, prefix: &str, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<ParamValue>,
        V: Into<ParamValue>,
    {
        for (index, (name, value)) in pairs.into_iter().enumerate() {
            let n = index + 1;
            self.insert(format!("{prefix}.{n}.Name"), name);
            self.insert(format!("{prefix}.{n}.Value"), value);
        }
    }

    /// Append `{prefix}.{n}` entries, numbered from 1
    pub fn push_indexed<I, V>(&mut self, prefix: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        for (index, value) in values.into_iter().enumerate() {
            self.insert(format!("{prefix}.{}", index + 1), value);
        }
    }

    /// Stringified pairs in key order
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One logical remote operation prior to signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCall {
    pub action: String,
    pub params: Params,
    /// Overrides the client's default endpoint (queue URL for queue-scoped actions)
    pub target: Option<String>,
    pub method: Method,
}

impl ActionCall {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: Params::new(),
            target: None,
            method: Method::POST,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_sorted_bytewise() {
        let params = Params::new()
            .with("B", 2)
            .with("A", 1)
            .with("Action", "ListQueues")
            .with("AWSAccessKeyId", "key");

        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["A", "AWSAccessKeyId", "Action", "B"]);
    }

    #[test]
    fn test_int_rendering() {
        assert_eq!(ParamValue::from(-12_345_678_i64).to_string(), "-12345678");
        assert_eq!(ParamValue::from(262_144_u32).to_string(), "262144");
    }

    #[test]
    fn test_insert_replaces() {
        let mut params = Params::new();
        params.insert("VisibilityTimeout", 10);
        params.insert("VisibilityTimeout", 123);

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("VisibilityTimeout"), Some(&ParamValue::Int(123)));
    }

    #[test]
    fn test_push_attributes() {
        let mut params = Params::new().with("QueueName", "orders");
        params.push_attributes(
            "Attribute",
            vec![("DelaySeconds", ParamValue::Int(100)), ("Policy", "{}".into())],
        );

        assert_eq!(params.get("Attribute.1.Name"), Some(&"DelaySeconds".into()));
        assert_eq!(params.get("Attribute.1.Value"), Some(&ParamValue::Int(100)));
        assert_eq!(params.get("Attribute.2.Name"), Some(&"Policy".into()));
        assert_eq!(params.get("Attribute.2.Value"), Some(&"{}".into()));
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn test_push_indexed() {
        let mut params = Params::new();
        params.push_indexed("AttributeName", ["All"]);
        assert_eq!(params.to_pairs(), vec![("AttributeName.1".to_string(), "All".to_string())]);
    }

    #[test]
    fn test_action_call_defaults() {
        let call = ActionCall::new("DeleteQueue").with_target("http://test.x/blub");
        assert_eq!(call.method, Method::POST);
        assert!(call.params.is_empty());
        assert_eq!(call.target.as_deref(), Some("http://test.x/blub"));
    }
}
