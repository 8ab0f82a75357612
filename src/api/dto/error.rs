//! Error response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every error response: `{"error": "<message>"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "title is required")]
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
