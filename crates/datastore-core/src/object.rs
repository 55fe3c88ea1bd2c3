//! The unit of persistence handed to a [`DataStore`](crate::DataStore).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An entity record: its logical type, an id once persisted, and its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataObject {
    /// Store-assigned id. `None` until created.
    pub id: Option<u64>,
    /// Logical entity type, e.g. `"product"`.
    pub object_type: String,
    /// Entity properties.
    #[serde(default)]
    pub props: Map<String, Value>,
}

impl DataObject {
    /// Create an unsaved object of the given type.
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            id: None,
            object_type: object_type.into(),
            props: Map::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Get a property.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Set a property, returning the previous value.
    pub fn set_prop(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.props.insert(key.into(), value.into())
    }

    /// Whether the object has been persisted.
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }
}
