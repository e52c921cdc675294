// src/document.rs

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::StoreError;

pub const ID_FIELD: &str = "_id";
pub const ENTITY_ID_FIELD: &str = "entity_id";
pub const LONGITUDE_FIELD: &str = "longitude";
pub const LATITUDE_FIELD: &str = "latitude";
pub const LOCATION_FIELD: &str = "loc";

/// Collection holding the entity documents that receive `loc`.
pub const ENTITIES_COLLECTION: &str = "entities";
/// Collection holding per-entity geo attributes, keyed by the entity's id.
pub const GEOS_COLLECTION: &str = "geos";

/// A stored document: its `_id` plus every other top-level field.
///
/// `_id` must be a string. The REST backend addresses documents by a string
/// `objectId`, so documents keyed by numbers or ObjectIds are rejected by
/// [`EntityDocument::from_value`] instead of being coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EntityDocument {
    pub fn new(id: impl Into<String>) -> Self {
        EntityDocument {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builds a document from a JSON object carrying an `_id` string.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        serde_json::from_value(value).map_err(StoreError::JsonError)
    }

    pub fn with<T: Serialize>(mut self, field_name: &str, value: T) -> Result<Self, StoreError> {
        self.set(field_name, value)?;
        Ok(self)
    }

    pub fn set<T: Serialize>(&mut self, field_name: &str, value: T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value)?;
        self.fields.insert(field_name.to_string(), value);
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, field_name: &str) -> Option<T> {
        self.fields
            .get(field_name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn raw(&self, field_name: &str) -> Option<&Value> {
        self.fields.get(field_name)
    }

    /// The stored `longitude`, or `null` if the document has none.
    pub fn longitude(&self) -> Value {
        self.raw(LONGITUDE_FIELD).cloned().unwrap_or(Value::Null)
    }

    /// The stored `latitude`, or `null` if the document has none.
    pub fn latitude(&self) -> Value {
        self.raw(LATITUDE_FIELD).cloned().unwrap_or(Value::Null)
    }
}
