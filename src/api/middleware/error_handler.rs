//! Normalizes error bodies produced outside the handlers.
//!
//! Axum answers unknown paths and wrong methods with empty or plain-text
//! bodies. This middleware rewrites those into the same `{"error": ...}`
//! shape the todo handlers use.

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::dto::ErrorResponse;

/// Upper bound on a plain-text error body we are willing to buffer.
const MAX_ERROR_BODY: usize = 64 * 1024;

pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if is_json {
        return response;
    }

    let (parts, body) = response.into_parts();
    let original_message = axum::body::to_bytes(body, MAX_ERROR_BODY)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();

    let message = if original_message.is_empty() {
        default_message(status).to_string()
    } else {
        original_message
    };

    let mut normalized = (status, Json(ErrorResponse::new(message))).into_response();
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            normalized.headers_mut().insert(name.clone(), value.clone());
        }
    }
    normalized
}

fn default_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad request",
        StatusCode::NOT_FOUND => "The requested resource was not found",
        StatusCode::METHOD_NOT_ALLOWED => "HTTP method not allowed for this endpoint",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "Unsupported media type",
        StatusCode::PAYLOAD_TOO_LARGE => "Request payload too large",
        StatusCode::REQUEST_TIMEOUT => "Request timeout",
        StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable",
        s if s.is_server_error() => "An internal server error occurred",
        _ => "Request failed",
    }
}
