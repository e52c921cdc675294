// src/normalizer.rs

use crate::document::{
    EntityDocument, ENTITIES_COLLECTION, GEOS_COLLECTION, LATITUDE_FIELD, LOCATION_FIELD,
    LONGITUDE_FIELD,
};
use crate::geojson::GeoJsonPoint;
use crate::store::{EntityStore, UpdateOne};
use crate::StoreError;

/// The update that sets `loc` on `doc` from its own `longitude`/`latitude`.
///
/// Coordinates are copied as-is: a missing field becomes `null` and a
/// non-numeric one is written verbatim.
pub fn location_update(doc: &EntityDocument) -> UpdateOne {
    let point = GeoJsonPoint::from_raw(doc.longitude(), doc.latitude());
    UpdateOne::new(ENTITIES_COLLECTION, &doc.id)
        .set(LOCATION_FIELD, point.to_value())
        .upsert(false)
}

/// Like [`location_update`], but also copies `longitude`/`latitude` onto the entity.
fn geo_copy_update(geo: &EntityDocument) -> UpdateOne {
    let (longitude, latitude) = (geo.longitude(), geo.latitude());
    let point = GeoJsonPoint::from_raw(longitude.clone(), latitude.clone());
    UpdateOne::new(ENTITIES_COLLECTION, &geo.id)
        .set(LATITUDE_FIELD, latitude)
        .set(LONGITUDE_FIELD, longitude)
        .set(LOCATION_FIELD, point.to_value())
        .upsert(false)
}

/// Counters returned by [`LocationNormalizer::copy_geo_locations`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeoSyncSummary {
    /// Entity ids visited.
    pub scanned: u64,
    /// Ids that had a `geos` document.
    pub found: u64,
    /// Entity documents the update matched.
    pub matched: u64,
}

/// Writes GeoJSON `loc` fields onto entity documents.
#[derive(Debug, Clone)]
pub struct LocationNormalizer<S> {
    store: S,
}

impl<S: EntityStore> LocationNormalizer<S> {
    pub fn new(store: S) -> Self {
        LocationNormalizer { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Sets `loc` to `{ type: "Point", coordinates: [longitude, latitude] }` on
    /// the `entities` document whose `_id` is `doc.id`.
    ///
    /// One non-upserting write. If no document has that id nothing is created.
    /// Store failures are returned untouched.
    pub async fn normalize_location(&self, doc: &EntityDocument) -> Result<(), StoreError> {
        let update = location_update(doc);
        log::debug!("Setting {} on entity '{}'", LOCATION_FIELD, update.id);
        self.store.update_one(&update).await?;
        Ok(())
    }

    /// Copies `longitude`, `latitude` and a derived `loc` from each entity's
    /// `geos` document onto the entity itself.
    ///
    /// Ids without a `geos` document are skipped. The first store error stops
    /// the run.
    pub async fn copy_geo_locations<I, T>(&self, entity_ids: I) -> Result<GeoSyncSummary, StoreError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut summary = GeoSyncSummary::default();
        for entity_id in entity_ids {
            let entity_id = entity_id.as_ref();
            summary.scanned += 1;

            let Some(geo) = self.store.find_by_id(GEOS_COLLECTION, entity_id).await? else {
                log::debug!("No geo document for entity '{}'", entity_id);
                continue;
            };
            summary.found += 1;

            let outcome = self.store.update_one(&geo_copy_update(&geo)).await?;
            summary.matched += outcome.matched;
        }
        log::debug!("Geo location copy finished: {:?}", summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn location_update_targets_entities_by_id_without_upsert() {
        let doc = EntityDocument::from_value(json!({
            "_id": "A1", "longitude": -122.42, "latitude": 37.77
        }))
        .unwrap();
        let update = location_update(&doc);
        assert_eq!(update.collection, "entities");
        assert_eq!(update.id, "A1");
        assert!(!update.upsert);
        assert_eq!(update.set.len(), 1);
        assert_eq!(
            update.set["loc"],
            json!({"type": "Point", "coordinates": [-122.42, 37.77]})
        );
    }

    #[test]
    fn geo_copy_update_sets_all_three_fields() {
        let geo = EntityDocument::from_value(json!({
            "_id": "e7", "entity_id": "e7", "longitude": 2.35, "latitude": 48.85
        }))
        .unwrap();
        let update = geo_copy_update(&geo);
        assert_eq!(update.id, "e7");
        assert_eq!(update.set["longitude"], json!(2.35));
        assert_eq!(update.set["latitude"], json!(48.85));
        assert_eq!(
            update.set["loc"],
            json!({"type": "Point", "coordinates": [2.35, 48.85]})
        );
        assert!(update.set.get("entity_id").is_none());
    }
}
