// src/error.rs

use reqwest::header::InvalidHeaderValue;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("URL parsing failed: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("JSON processing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonDeserializationFailed(String),

    #[error("Store API error (code {code}): {message}")]
    ApiError { code: u16, message: String },

    /// The server answered with an explicit "object not found" code.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// A 404 without an object-not-found code: the route itself is missing,
    /// usually a wrong server URL or mount path.
    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid collection name: {0}")]
    InvalidCollectionName(String),

    #[error("Operation forbidden: {0}")]
    OperationForbidden(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Duplicate value: {0}")]
    DuplicateValue(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(InvalidHeaderValue),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),
}

// Error codes a classes endpoint sends back for GET/PUT/POST on a single object.
const OBJECT_NOT_FOUND: u16 = 101;
const INVALID_CLASS_NAME: u16 = 103;
const INCORRECT_TYPE: u16 = 111;
const OPERATION_FORBIDDEN: u16 = 119;
// Upsert fallback creating an objectId that already exists
const DUPLICATE_VALUE: u16 = 137;

impl StoreError {
    /// Maps an error response (`{"code": .., "error": ..}`) to a `StoreError`.
    ///
    /// Only an explicit object-not-found code yields [`StoreError::ObjectNotFound`];
    /// a bare 404 is reported as [`StoreError::EndpointNotFound`].
    pub(crate) fn from_response(status_code: u16, response_body: Value) -> Self {
        let code = response_body
            .get("code")
            .and_then(|v| v.as_u64())
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(0);
        let message = response_body
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        let detail = format!("(HTTP {}, code {}) {}", status_code, code, message);

        match (code, status_code) {
            (OBJECT_NOT_FOUND, _) => StoreError::ObjectNotFound(detail),
            (INVALID_CLASS_NAME, _) => StoreError::InvalidCollectionName(detail),
            (INCORRECT_TYPE, _) => StoreError::InvalidInput(detail),
            (OPERATION_FORBIDDEN, _) => StoreError::OperationForbidden(detail),
            (DUPLICATE_VALUE, _) => StoreError::DuplicateValue(detail),
            (_, 500..=u16::MAX) => StoreError::InternalServerError(detail),
            (_, 401 | 403) => StoreError::AuthenticationError(detail),
            (_, 404) => StoreError::EndpointNotFound(detail),
            _ => StoreError::ApiError { code, message },
        }
    }

    /// True only when the server said the addressed object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::ObjectNotFound(_))
    }
}
