// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{validate_target, EntityStore, UpdateOne, UpdateOutcome};
use crate::document::EntityDocument;
use crate::StoreError;

type Collection = HashMap<String, EntityDocument>;

/// An in-process [`EntityStore`] keeping every collection in a map keyed by `_id`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `doc` in `collection`.
    pub async fn insert(&self, collection: &str, doc: EntityDocument) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), doc);
    }

    pub async fn get(&self, collection: &str, id: &str) -> Option<EntityDocument> {
        let collections = self.collections.read().await;
        collections.get(collection).and_then(|c| c.get(id)).cloned()
    }

    pub async fn len(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, |c| c.len())
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn update_one(&self, update: &UpdateOne) -> Result<UpdateOutcome, StoreError> {
        validate_target(&update.collection, &update.id)?;
        let mut collections = self.collections.write().await;

        if let Some(doc) = collections
            .get_mut(&update.collection)
            .and_then(|c| c.get_mut(&update.id))
        {
            let mut changed = false;
            for (field_name, value) in &update.set {
                if doc.fields.get(field_name) != Some(value) {
                    doc.fields.insert(field_name.clone(), value.clone());
                    changed = true;
                }
            }
            return Ok(UpdateOutcome {
                matched: 1,
                modified: u64::from(changed),
                upserted: false,
            });
        }

        if !update.upsert {
            log::debug!(
                "No document '{}' in '{}'; skipping update",
                update.id,
                update.collection
            );
            return Ok(UpdateOutcome::unmatched());
        }

        let doc = EntityDocument {
            id: update.id.clone(),
            fields: update.set.clone(),
        };
        collections
            .entry(update.collection.clone())
            .or_default()
            .insert(update.id.clone(), doc);
        Ok(UpdateOutcome {
            matched: 0,
            modified: 0,
            upserted: true,
        })
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<EntityDocument>, StoreError> {
        validate_target(collection, id)?;
        Ok(self.get(collection, id).await)
    }
}
