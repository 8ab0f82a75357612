//! Request extractors for the todo routes.
//!
//! Both reject with the same terse messages regardless of what exactly
//! was wrong with the input.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{StatusCode, request::Parts},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::api::error::ApiError;

pub const INVALID_ID: &str = "Invalid ID";
pub const INVALID_BODY: &str = "Invalid request body";

/// The `{id}` path segment parsed as a signed 64-bit integer.
///
/// Range checks belong to the service; `0` and negative values pass here.
#[derive(Debug, Clone, Copy)]
pub struct TodoId(pub i64);

impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "Path rejected");
                ApiError::new(StatusCode::BAD_REQUEST, INVALID_ID)
            })?;

        raw.parse::<i64>().map(TodoId).map_err(|e| {
            tracing::debug!(raw = %raw, error = %e, "Id is not an integer");
            ApiError::new(StatusCode::BAD_REQUEST, INVALID_ID)
        })
    }
}

/// A JSON request body.
///
/// Decoding is lenient in the same ways as a stream decoder feeding a
/// struct:
/// - the `Content-Type` header is not checked
/// - only the first JSON value is read; anything after it is ignored
/// - `null`, or a `null` field, leaves the serde defaults in place
/// - object keys match field names case-insensitively
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "Body could not be read");
            ApiError::new(StatusCode::BAD_REQUEST, INVALID_BODY)
        })?;

        decode_body(&bytes).map(JsonBody).map_err(|e| {
            tracing::debug!(error = %e, "Body is not valid JSON for this route");
            ApiError::new(StatusCode::BAD_REQUEST, INVALID_BODY)
        })
    }
}

fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    let value = serde_json::Deserializer::from_slice(bytes)
        .into_iter::<Value>()
        .next()
        .unwrap_or_else(|| Err(serde::de::Error::custom("empty body")))?;

    serde_json::from_value(Value::Object(normalize(value)?))
}

/// Lowercases keys and drops `null` members. A bare `null` is an empty
/// object; any other non-object value is rejected.
fn normalize(value: Value) -> Result<Map<String, Value>, serde_json::Error> {
    match value {
        Value::Null => Ok(Map::new()),
        Value::Object(fields) => Ok(fields
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect()),
        other => Err(serde::de::Error::custom(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}
