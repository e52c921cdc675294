use dotenvy::dotenv;
use entity_loc::document::ENTITIES_COLLECTION;
use entity_loc::{EntityDocument, MemoryStore, RestStore, RestStoreConfig};
use serde_json::json;
use std::sync::Once;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

fn initialize_logger_once() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub mod shared {
    use super::*;

    #[allow(dead_code)]
    pub fn entity(id: &str, longitude: f64, latitude: f64) -> EntityDocument {
        EntityDocument::from_value(json!({
            "_id": id,
            "type": "d41d8cd98f00b204e9800998ecf8427e",
            "longitude": longitude,
            "latitude": latitude,
        }))
        .expect("valid entity document")
    }

    // Store pre-loaded with the given entity documents
    #[allow(dead_code)]
    pub async fn memory_store_with(docs: Vec<EntityDocument>) -> MemoryStore {
        initialize_logger_once();
        let store = MemoryStore::new();
        for doc in docs {
            store.insert(ENTITIES_COLLECTION, doc).await;
        }
        store
    }

    // RestStore pointed at an httpmock server
    #[allow(dead_code)]
    pub fn mock_rest_store(base_url: &str) -> RestStore {
        initialize_logger_once();
        RestStore::new(base_url, "flame", None, Some("masterKey"))
            .expect("Failed to create RestStore for mock server")
    }

    // RestStore built from ENTITY_STORE_* variables, for tests against a live server
    #[allow(dead_code)]
    pub fn setup_live_store() -> RestStore {
        initialize_logger_once();
        dotenv().ok();
        let config = RestStoreConfig::from_env().expect("ENTITY_STORE_* variables not set");
        RestStore::from_config(&config).expect("Failed to create RestStore for live tests")
    }

    #[allow(dead_code)]
    pub fn unique_id(base: &str) -> String {
        format!("{}_{}", base, Uuid::new_v4().simple())
    }
}
