//! Response parsers for `dorequest.php` replies.
//!
//! # Design
//! Every operation shares one classification step: a blank body or `{}` is
//! `Empty`, `"Success": true` is `Success`, anything else that is a JSON
//! object is `Error`. Only a body that is not a JSON object at all, or a
//! field of the wrong type, surfaces as `Err`. The per-operation functions
//! just pick the payload types.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::{
    AwardAchievement, AwardAchievementError, AwardAchievements, Login, Ping, Response,
    ServiceError, StartSession,
};

impl<T: DeserializeOwned, E: DeserializeOwned> Response<T, E> {
    /// Classify an already-decoded reply.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Response::Empty),
            other => {
                return Err(ApiError::DeserializationError(format!(
                    "expected a JSON object, got {other}"
                )))
            }
        };
        if map.is_empty() {
            return Ok(Response::Empty);
        }
        let success = map.get("Success").and_then(Value::as_bool).unwrap_or(false);
        let value = Value::Object(map);
        if success {
            Ok(Response::Success(serde_json::from_value(value)?))
        } else {
            Ok(Response::Error(serde_json::from_value(value)?))
        }
    }
}

/// Decode and classify a raw reply body.
pub fn parse_body<T: DeserializeOwned, E: DeserializeOwned>(
    body: &str,
) -> Result<Response<T, E>, ApiError> {
    if body.trim().is_empty() {
        tracing::debug!("empty response body");
        return Ok(Response::Empty);
    }
    let value: Value = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "response body is not JSON");
        ApiError::from(e)
    })?;
    let response = Response::from_value(value)?;
    tracing::debug!(kind = ?response.kind(), "classified response");
    Ok(response)
}

pub fn parse_login(body: &str) -> Result<Response<Login>, ApiError> {
    parse_body(body)
}

pub fn parse_start_session(body: &str) -> Result<Response<StartSession>, ApiError> {
    parse_body(body)
}

pub fn parse_ping(body: &str) -> Result<Response<Ping>, ApiError> {
    parse_body(body)
}

/// Rejections keep the echoed achievement id and scores.
pub fn parse_award_achievement(
    body: &str,
) -> Result<Response<AwardAchievement, AwardAchievementError>, ApiError> {
    parse_body(body)
}

pub fn parse_award_achievements(
    body: &str,
) -> Result<Response<AwardAchievements, ServiceError>, ApiError> {
    parse_body(body)
}
