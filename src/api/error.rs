//! HTTP error responses.
//!
//! Every todo route answers failures with one fixed status, whatever the
//! underlying [`AppError`] is. The kind is still logged so operators can
//! tell a missing row from a dead database.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::ErrorResponse;
use crate::error::{AppError, ErrorKind};

/// An error ready to be sent to the client as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Respond `400 Bad Request` with the error's display text.
    pub fn bad_request(error: AppError) -> Self {
        Self::from_app_error(StatusCode::BAD_REQUEST, error)
    }

    /// Respond `404 Not Found` with the error's display text.
    pub fn not_found(error: AppError) -> Self {
        Self::from_app_error(StatusCode::NOT_FOUND, error)
    }

    /// Respond `500 Internal Server Error` with the error's display text.
    pub fn internal(error: AppError) -> Self {
        Self::from_app_error(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_app_error(status: StatusCode, error: AppError) -> Self {
        let kind = error.kind();
        match kind {
            ErrorKind::Internal => tracing::error!(
                status = status.as_u16(),
                kind = kind.as_str(),
                error = %error,
                "Request failed"
            ),
            ErrorKind::InvalidArgument | ErrorKind::NotFound => tracing::warn!(
                status = status.as_u16(),
                kind = kind.as_str(),
                error = %error,
                "Request rejected"
            ),
        }
        Self::new(status, error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_is_fixed_by_constructor() {
        // A missing row on a route that maps failures to 400 stays 400.
        let error = ApiError::bad_request(AppError::todo_not_found(9));
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.message(), "todo with id=9 not found");

        let error = ApiError::not_found(AppError::invalid_argument("id", "invalid id"));
        assert_eq!(error.status(), StatusCode::NOT_FOUND);

        let error = ApiError::internal(AppError::DeadlineExceeded);
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_into_response_writes_error_body() {
        let response = ApiError::bad_request(AppError::invalid_argument("title", "title is required"))
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "title is required" })
        );
    }
}
