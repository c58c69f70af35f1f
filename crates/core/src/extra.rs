//! Extension payload carried by every item record.
//!
//! The payload shape is chosen once for the whole project through an
//! [`ExtraSchema`] in the settings. The core only stores and copies it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single extension field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExtraValue {
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// String value
    Text(String),
    /// Array of values
    List(Vec<ExtraValue>),
}

impl ExtraValue {
    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as float (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Opaque per-item payload tagged with the schema it was built from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtraInfo {
    /// Name of the schema this payload follows, if any.
    pub schema: Option<String>,
    /// Field values keyed by field name.
    pub fields: BTreeMap<String, ExtraValue>,
}

impl ExtraInfo {
    /// Look up a field.
    pub fn get(&self, field: &str) -> Option<&ExtraValue> {
        self.fields.get(field)
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: ExtraValue) -> Option<ExtraValue> {
        self.fields.insert(field.into(), value)
    }

    /// True when the payload has no schema and no fields.
    pub fn is_empty(&self) -> bool {
        self.schema.is_none() && self.fields.is_empty()
    }
}

/// Project-wide payload shape: a schema name plus default field values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraSchema {
    /// Schema name stamped into every conforming payload.
    pub name: String,
    /// Default field values.
    pub defaults: BTreeMap<String, ExtraValue>,
}

impl ExtraSchema {
    /// Create an empty schema with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: BTreeMap::new(),
        }
    }

    /// Add a default field value.
    pub fn with_default(mut self, field: impl Into<String>, value: ExtraValue) -> Self {
        self.defaults.insert(field.into(), value);
        self
    }

    /// Build a fresh payload holding only the defaults.
    pub fn instantiate(&self) -> ExtraInfo {
        ExtraInfo {
            schema: Some(self.name.clone()),
            fields: self.defaults.clone(),
        }
    }

    /// Bring `extra` in line with this schema.
    ///
    /// A payload built from another schema (or none) is replaced by the
    /// defaults; a matching payload only gains the fields it is missing.
    /// Returns true when the payload was reset.
    pub fn conform(&self, extra: &mut ExtraInfo) -> bool {
        if extra.schema.as_deref() != Some(self.name.as_str()) {
            let had_schema = extra.schema.is_some();
            *extra = self.instantiate();
            if had_schema {
                tracing::debug!(schema = %self.name, "extension payload reset to configured schema");
            }
            return true;
        }
        for (field, value) in &self.defaults {
            extra
                .fields
                .entry(field.clone())
                .or_insert_with(|| value.clone());
        }
        false
    }
}
