//! Invocants.
//!
//! Attribute storage is out of scope, so an instance is just a type name
//! plus a bag of JSON fields that operation bodies may read.

use serde::{Deserialize, Serialize};
pub use serde_json::Value;

/// An object whose operations are being called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Name of the instance's (most-derived) type
    pub type_name: String,
    /// Free-form fields
    #[serde(default)]
    pub fields: serde_json::Map<String, Value>,
}

impl Instance {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: serde_json::Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
