//! Todo-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Todo;

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for creating a todo.
///
/// A missing `title` decodes as the empty string and is then rejected by
/// the service.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateTodoRequest {
    #[schema(example = "buy milk")]
    pub title: String,
}

/// Request body for replacing a todo's title.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateTitleRequest {
    #[schema(example = "buy oat milk")]
    pub title: String,
}

/// Request body for setting a todo's completion flag.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateCompletedRequest {
    pub completed: bool,
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Response body for a single todo.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "buy milk")]
    pub title: String,
    pub completed: bool,
    #[schema(value_type = String, format = DateTime, example = "2025-06-01T12:00:00Z")]
    pub created_at: jiff::Timestamp,
    #[schema(value_type = String, format = DateTime, example = "2025-06-01T12:00:00Z")]
    pub updated_at: jiff::Timestamp,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            completed: todo.completed,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let create: CreateTodoRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(create.title, "");

        let completed: UpdateCompletedRequest = serde_json::from_str("{}").unwrap();
        assert!(!completed.completed);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(serde_json::from_str::<UpdateCompletedRequest>(r#"{"completed":"yes"}"#).is_err());
        assert!(serde_json::from_str::<CreateTodoRequest>(r#"{"title":5}"#).is_err());
    }

    #[test]
    fn test_response_uses_camel_case_rfc3339() {
        let ts: jiff::Timestamp = "2025-06-01T12:00:00Z".parse().unwrap();
        let response = TodoResponse::from(Todo {
            id: 1,
            title: "buy milk".to_string(),
            completed: false,
            created_at: ts,
            updated_at: ts,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "title": "buy milk",
                "completed": false,
                "createdAt": "2025-06-01T12:00:00Z",
                "updatedAt": "2025-06-01T12:00:00Z",
            })
        );
    }
}
