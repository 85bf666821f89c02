//! Error types for the RetroAchievements client core.
//!
//! # Design
//! Only local failures are errors. A reply in which the service rejects the
//! call (bad credentials, unknown game, duplicate unlock) is data and comes
//! back as `Response::Error`; an empty reply comes back as `Response::Empty`.
//! What remains is input that never reached the wire (`MissingField`,
//! `InvalidHost`) and a body that is not a JSON object at all
//! (`DeserializationError`).

use thiserror::Error;

/// Errors returned by the `build_*` and `parse_*` functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// A required input was empty or absent. No request was built.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The host does not form a valid `https://{host}/dorequest.php` URL.
    #[error("invalid host: {0}")]
    InvalidHost(String),

    /// The response body is non-empty but is not a JSON object, or a field
    /// has the wrong JSON type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

impl ApiError {
    /// True for failures raised before a request was built.
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::MissingField(_) | ApiError::InvalidHost(_))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::DeserializationError(e.to_string())
    }
}
