//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `todo` - Todo request/response DTOs
//! - `error` - Common error response DTOs
//! - `health` - Readiness check DTOs

mod error;
mod health;
mod todo;

pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use todo::{CreateTodoRequest, TodoResponse, UpdateCompletedRequest, UpdateTitleRequest};
