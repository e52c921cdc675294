use crate::StoreError;

pub const URL_ENV: &str = "ENTITY_STORE_URL";
pub const APP_ID_ENV: &str = "ENTITY_STORE_APP_ID";
pub const REST_API_KEY_ENV: &str = "ENTITY_STORE_REST_API_KEY";
pub const MASTER_KEY_ENV: &str = "ENTITY_STORE_MASTER_KEY";

/// Connection settings for a [`RestStore`](crate::store::RestStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestStoreConfig {
    /// Base URL of the server, with or without the trailing `/parse`.
    pub server_url: String,
    pub app_id: String,
    pub rest_api_key: Option<String>,
    /// Preferred over the REST API key when both are set.
    pub master_key: Option<String>,
}

impl RestStoreConfig {
    pub fn new(server_url: &str, app_id: &str) -> Self {
        RestStoreConfig {
            server_url: server_url.to_string(),
            app_id: app_id.to_string(),
            rest_api_key: None,
            master_key: None,
        }
    }

    pub fn with_rest_api_key(mut self, key: &str) -> Self {
        self.rest_api_key = Some(key.to_string());
        self
    }

    pub fn with_master_key(mut self, key: &str) -> Self {
        self.master_key = Some(key.to_string());
        self
    }

    /// Reads the settings from `ENTITY_STORE_*` environment variables.
    ///
    /// The URL and application id are required; the keys are optional.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| StoreError::MissingConfig(format!("{} is not set", name)))
        };
        let optional = |name: &str| lookup(name).filter(|v| !v.is_empty());

        Ok(RestStoreConfig {
            server_url: required(URL_ENV)?,
            app_id: required(APP_ID_ENV)?,
            rest_api_key: optional(REST_API_KEY_ENV),
            master_key: optional(MASTER_KEY_ENV),
        })
    }
}
