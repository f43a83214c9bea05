//! Value records: aggregates with copy semantics

use indexmap::IndexMap;
use serde::Serialize;

use super::Value;
use crate::error::{Result, SandboxError};

/// An aggregate of named primitive fields with value semantics.
///
/// Cloning a record is the copy: the clone owns its own fields, so
/// mutating it never touches the source. Field order is the order the
/// fields were added in.
///
/// # Example
///
/// ```
/// use semantics_sandbox::{Value, ValueRecord};
///
/// let original = ValueRecord::new("Size")
///     .with_field("width", 10)
///     .with_field("height", 20);
///
/// let mut copy = original.clone();
/// copy.set("width", 99).unwrap();
///
/// assert_eq!(original.get("width"), Some(&Value::Int(10)));
/// assert_eq!(copy.get("width"), Some(&Value::Int(99)));
/// ```
#[derive(Clone, PartialEq, Serialize)]
pub struct ValueRecord {
    /// The record's type name (e.g., "Size", "Resolution")
    pub type_name: String,

    /// Fields in definition order
    pub fields: IndexMap<String, Value>,
}

impl ValueRecord {
    /// Create an empty record
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Create a record from `(name, value)` pairs
    pub fn from_fields<K, V>(
        type_name: impl Into<String>,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            type_name: type_name.into(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add a field (builder pattern)
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Replace an existing field, returning the previous value.
    ///
    /// Records keep the shape they were built with; naming a field that
    /// does not exist is an error rather than an insertion.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Value> {
        match self.fields.get_mut(name) {
            Some(slot) => Ok(std::mem::replace(slot, value.into())),
            None => Err(SandboxError::unknown_field(&self.type_name, name)),
        }
    }

    /// Render as a JSON object of the fields.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.fields)
    }
}
