//! Attribute differ for diff based queue updates

use crate::mapper::{Attributes, FieldName, QUEUE_FIELDS};

/// One attribute to send with SetQueueAttributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    /// Wire attribute name, e.g. `DelaySeconds`
    pub name: String,
    pub value: String,
}

/// Computes the attributes that changed between two normalized versions
pub trait AttributeDiffer: Send + Sync {
    fn diff(&self, new: &Attributes, old: &Attributes) -> Vec<AttributeChange>;
}

/// Differ driven by a field name table
///
/// Only settable fields are compared. Fields missing from the new version
/// are left alone since SQS has no way to unset an attribute.
#[derive(Debug, Clone, Copy)]
pub struct QueueAttributeDiffer {
    fields: &'static [FieldName],
}

impl Default for QueueAttributeDiffer {
    fn default() -> Self {
        Self::new(QUEUE_FIELDS)
    }
}

impl QueueAttributeDiffer {
    pub fn new(fields: &'static [FieldName]) -> Self {
        Self { fields }
    }
}

impl AttributeDiffer for QueueAttributeDiffer {
    fn diff(&self, new: &Attributes, old: &Attributes) -> Vec<AttributeChange> {
        new.iter()
            .filter(|(field, value)| old.get(*field) != Some(*value))
            .filter_map(|(field, value)| {
                let entry = self.fields.iter().find(|f| f.field == field.as_str())?;
                entry.settable.then(|| AttributeChange {
                    name: entry.attribute.to_string(),
                    value: value.clone(),
                })
            })
            .collect()
    }
}
