pub mod config;
pub mod document;
pub mod error;
pub mod geojson;
pub mod normalizer;
pub mod store;

pub use config::RestStoreConfig;
pub use document::EntityDocument;
pub use error::StoreError;
pub use geojson::GeoJsonPoint;
pub use normalizer::{location_update, GeoSyncSummary, LocationNormalizer};
pub use store::{EntityStore, MemoryStore, RestStore, UpdateOne, UpdateOutcome};
