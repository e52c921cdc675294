// src/store/mod.rs

pub mod memory;
pub mod rest;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::document::EntityDocument;
use crate::StoreError;

pub use memory::MemoryStore;
pub use rest::RestStore;

/// A single-document update: `update({ _id: id }, { $set: set }, { upsert })`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOne {
    pub collection: String,
    pub id: String,
    pub set: Map<String, Value>,
    pub upsert: bool,
}

impl UpdateOne {
    pub fn new(collection: &str, id: &str) -> Self {
        UpdateOne {
            collection: collection.to_string(),
            id: id.to_string(),
            set: Map::new(),
            upsert: false,
        }
    }

    pub fn set(mut self, field_name: &str, value: Value) -> Self {
        self.set.insert(field_name.to_string(), value);
        self
    }

    pub fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }
}

/// What the store reports back for an [`UpdateOne`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
    pub upserted: bool,
}

impl UpdateOutcome {
    pub fn unmatched() -> Self {
        Self::default()
    }
}

/// The document-store surface needed by the location migrations.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Applies `update` to the document whose `_id` equals `update.id`.
    ///
    /// With `upsert` disabled a missing document is not an error: the outcome
    /// reports zero matches and the store is left unchanged.
    async fn update_one(&self, update: &UpdateOne) -> Result<UpdateOutcome, StoreError>;

    /// Fetches a document by `_id`, or `None` if there is no such document.
    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<EntityDocument>, StoreError>;
}

#[async_trait]
impl<S: EntityStore + ?Sized> EntityStore for &S {
    async fn update_one(&self, update: &UpdateOne) -> Result<UpdateOutcome, StoreError> {
        (**self).update_one(update).await
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<EntityDocument>, StoreError> {
        (**self).find_by_id(collection, id).await
    }
}

pub(crate) fn validate_target(collection: &str, id: &str) -> Result<(), StoreError> {
    if collection.is_empty() {
        return Err(StoreError::InvalidInput(
            "Collection name cannot be empty".to_string(),
        ));
    }
    if id.is_empty() {
        return Err(StoreError::InvalidInput(
            "Document ID cannot be empty".to_string(),
        ));
    }
    if !collection
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
    {
        return Err(StoreError::InvalidCollectionName(
            "must start with a letter or underscore.".to_string(),
        ));
    }
    if !collection.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidCollectionName(
            "can only contain letters, numbers, or underscores.".to_string(),
        ));
    }
    Ok(())
}
