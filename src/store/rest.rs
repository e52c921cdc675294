// src/store/rest.rs

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Response as HttpResponse, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{validate_target, EntityStore, UpdateOne, UpdateOutcome};
use crate::config::RestStoreConfig;
use crate::document::EntityDocument;
use crate::StoreError;

/// An [`EntityStore`] that talks to a Parse-style REST server.
///
/// Documents live under `/parse/classes/{collection}/{objectId}`. The server
/// persists them in MongoDB with `objectId` stored as `_id`, so the REST
/// object id and the document `_id` are the same value.
///
/// ```rust,no_run
/// use entity_loc::store::RestStore;
/// # use entity_loc::StoreError;
///
/// # fn main() -> Result<(), StoreError> {
/// let store = RestStore::new(
///     "http://localhost:1338/parse",
///     "flame",
///     None,             // rest_api_key
///     Some("masterKey"), // master_key
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RestStore {
    pub server_url: String,
    pub(crate) http_client: Client,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RetrievedRecord {
    object_id: String,
    #[serde(default)]
    #[allow(dead_code)]
    created_at: Option<Value>,
    #[serde(default)]
    #[allow(dead_code)]
    updated_at: Option<Value>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl From<RetrievedRecord> for EntityDocument {
    fn from(record: RetrievedRecord) -> Self {
        EntityDocument {
            id: record.object_id,
            fields: record.fields,
        }
    }
}

impl RestStore {
    /// Creates a store client.
    ///
    /// * `server_url`: base URL of the server, e.g. `"http://localhost:1338/parse"`.
    ///   A missing scheme defaults to `http://` and a trailing `/parse` is
    ///   stripped; it is added back to every request path.
    /// * `app_id`: sent as `X-Parse-Application-Id` on every request.
    /// * `rest_api_key` / `master_key`: the master key wins if both are given.
    pub fn new(
        server_url: &str,
        app_id: &str,
        rest_api_key: Option<&str>,
        master_key: Option<&str>,
    ) -> Result<Self, StoreError> {
        let mut temp_url_string = server_url.to_string();

        if !temp_url_string.starts_with("http://") && !temp_url_string.starts_with("https://") {
            temp_url_string = format!("http://{}", temp_url_string);
        }

        let parsed_server_url = Url::parse(&temp_url_string)?;

        if parsed_server_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(format!(
                "The server_url '{}' resolved to '{}', which cannot be a base URL.",
                server_url, parsed_server_url
            )));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            "X-Parse-Application-Id",
            HeaderValue::from_str(app_id).map_err(StoreError::InvalidHeaderValue)?,
        );

        if let Some(mk_str) = master_key {
            default_headers.insert(
                "X-Parse-Master-Key",
                HeaderValue::from_str(mk_str).map_err(StoreError::InvalidHeaderValue)?,
            );
        } else if let Some(rk_str) = rest_api_key {
            default_headers.insert(
                "X-Parse-REST-API-Key",
                HeaderValue::from_str(rk_str).map_err(StoreError::InvalidHeaderValue)?,
            );
        }

        let http_client = Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(StoreError::ReqwestError)?;

        let mut final_server_url = parsed_server_url.as_str().trim_end_matches('/').to_string();
        if final_server_url.ends_with("/parse") {
            final_server_url.truncate(final_server_url.len() - "/parse".len());
        }

        log::debug!(
            "RestStore initialized with base server_url: {}",
            final_server_url
        );

        Ok(Self {
            server_url: final_server_url,
            http_client,
        })
    }

    pub fn from_config(config: &RestStoreConfig) -> Result<Self, StoreError> {
        Self::new(
            &config.server_url,
            &config.app_id,
            config.rest_api_key.as_deref(),
            config.master_key.as_deref(),
        )
    }

    /// `{server_url}/parse/{segments..}`, each segment percent-encoded on its own
    /// so `/`, `?` and `#` inside an id stay part of that id.
    fn endpoint_url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(StoreError::InvalidInput(format!(
                "'{}' cannot be addressed as a path segment",
                bad
            )));
        }
        let mut url = Url::parse(&self.server_url).map_err(|e| {
            StoreError::InvalidUrl(format!(
                "Base server URL '{}' is invalid: {}",
                self.server_url, e
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                StoreError::InvalidUrl(format!(
                    "Base server URL '{}' cannot be a base",
                    self.server_url
                ))
            })?
            .pop_if_empty()
            .push("parse")
            .extend(segments);
        Ok(url)
    }

    async fn request<T: Serialize + Send + Sync, R: DeserializeOwned + Send + 'static>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&T>,
    ) -> Result<R, StoreError> {
        let full_url = self.endpoint_url(segments)?;
        let endpoint = full_url.path().to_string();
        log::debug!("Preparing request: Method={}, URL={}", method, full_url);

        let mut request_builder = self.http_client.request(method, full_url);
        if let Some(body_data) = body {
            let body_str = serde_json::to_string(body_data)?;
            request_builder = request_builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body_str);
        }

        let response = request_builder.send().await?;
        self.process_response(response, &endpoint).await
    }

    async fn process_response<R: DeserializeOwned>(
        &self,
        response: HttpResponse,
        endpoint: &str,
    ) -> Result<R, StoreError> {
        let status = response.status();
        let response_text = response.text().await.map_err(StoreError::ReqwestError)?;

        if status.is_success() {
            // 204 No Content and empty 200s carry no body; read them as `null`.
            let body = if response_text.trim().is_empty() {
                "null"
            } else {
                response_text.as_str()
            };
            return serde_json::from_str::<R>(body).map_err(|e| {
                log::error!(
                    "JSON deserialization failed for '{}'. Status: {}. Error: {}. Body: {}",
                    endpoint,
                    status,
                    e,
                    &response_text
                );
                StoreError::JsonDeserializationFailed(format!(
                    "Failed to deserialize response from '{}': {}. Body: {}",
                    endpoint, e, &response_text
                ))
            });
        }

        let parsed_body: Value = match serde_json::from_str(&response_text) {
            Ok(json_val) => json_val,
            Err(_) => {
                log::warn!(
                    "Failed to parse error response body as JSON from '{}'. Status: {}. Body: {}",
                    endpoint,
                    status,
                    &response_text
                );
                serde_json::json!({
                    "error": format!("HTTP Error {} with non-JSON body", status),
                    "body_snippet": response_text.chars().take(100).collect::<String>(),
                })
            }
        };
        Err(StoreError::from_response(status.as_u16(), parsed_body))
    }

    async fn insert_with_id(&self, update: &UpdateOne) -> Result<UpdateOutcome, StoreError> {
        let mut body = update.set.clone();
        body.insert("objectId".to_string(), Value::String(update.id.clone()));
        let segments = ["classes", update.collection.as_str()];
        let _: Value = self.request(Method::POST, &segments, Some(&body)).await?;
        Ok(UpdateOutcome {
            matched: 0,
            modified: 0,
            upserted: true,
        })
    }
}

#[async_trait]
impl EntityStore for RestStore {
    async fn update_one(&self, update: &UpdateOne) -> Result<UpdateOutcome, StoreError> {
        validate_target(&update.collection, &update.id)?;
        let segments = ["classes", update.collection.as_str(), update.id.as_str()];

        match self
            .request::<_, Value>(Method::PUT, &segments, Some(&update.set))
            .await
        {
            Ok(_) => Ok(UpdateOutcome {
                matched: 1,
                modified: 1,
                upserted: false,
            }),
            Err(e) if e.is_not_found() && update.upsert => {
                log::debug!("'{}' not found in '{}'; upserting", update.id, update.collection);
                self.insert_with_id(update).await
            }
            Err(e) if e.is_not_found() => {
                log::debug!(
                    "'{}' not found in '{}'; skipping update",
                    update.id,
                    update.collection
                );
                Ok(UpdateOutcome::unmatched())
            }
            Err(e) => Err(e),
        }
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<EntityDocument>, StoreError> {
        validate_target(collection, id)?;
        match self
            .request::<Value, RetrievedRecord>(Method::GET, &["classes", collection, id], None)
            .await
        {
            Ok(record) => Ok(Some(record.into())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_parse_and_defaults_scheme() {
        let store = RestStore::new("localhost:1338/parse/", "app", None, None).unwrap();
        assert_eq!(store.server_url, "http://localhost:1338");
        assert_eq!(
            store
                .endpoint_url(&["classes", "entities", "A1"])
                .unwrap()
                .as_str(),
            "http://localhost:1338/parse/classes/entities/A1"
        );
    }

    #[test]
    fn ids_with_path_characters_stay_one_segment() {
        let store = RestStore::new("http://localhost:1338", "app", None, None).unwrap();
        let url = |id: &str| {
            store
                .endpoint_url(&["classes", "entities", id])
                .unwrap()
                .to_string()
        };
        assert_eq!(
            url("../users/admin"),
            "http://localhost:1338/parse/classes/entities/..%2Fusers%2Fadmin"
        );
        assert_eq!(url("A1#x"), "http://localhost:1338/parse/classes/entities/A1%23x");
        assert_eq!(url("A1?x=1"), "http://localhost:1338/parse/classes/entities/A1%3Fx=1");
    }

    #[test]
    fn dot_segments_are_rejected() {
        let store = RestStore::new("http://localhost:1338", "app", None, None).unwrap();
        for id in [".", ".."] {
            assert!(matches!(
                store.endpoint_url(&["classes", "entities", id]),
                Err(StoreError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn keeps_a_base_path_in_front_of_parse() {
        let store = RestStore::new("http://localhost:1338/api/parse", "app", None, None).unwrap();
        assert_eq!(
            store.endpoint_url(&["classes", "geos", "e1"]).unwrap().as_str(),
            "http://localhost:1338/api/parse/classes/geos/e1"
        );
    }

    #[test]
    fn rejects_header_unsafe_app_id() {
        let result = RestStore::new("http://localhost:1338", "bad\nid", None, None);
        assert!(matches!(result, Err(StoreError::InvalidHeaderValue(_))));
    }
}
