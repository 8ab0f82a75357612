//! Todo CRUD request handlers.
//!
//! Each route maps every service failure to one fixed status:
//! list → 500, get/delete → 404, create/update → 400.

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::TODO_TAG;
use crate::api::dto::{
    CreateTodoRequest, ErrorResponse, TodoResponse, UpdateCompletedRequest, UpdateTitleRequest,
};
use crate::api::error::ApiError;
use crate::api::extract::{JsonBody, TodoId};
use crate::context::Context;
use crate::state::AppState;

/// Creates todo routes.
///
/// Routes:
/// - GET /todos                   - List all todos
/// - POST /todos                  - Create a todo
/// - GET /todos/{id}              - Get todo by ID
/// - DELETE /todos/{id}           - Delete todo by ID
/// - PATCH /todos/{id}/title      - Replace the title
/// - PATCH /todos/{id}/completed  - Set the completion flag
pub fn todo_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_todos))
        .routes(routes!(create_todo))
        .routes(routes!(get_todo))
        .routes(routes!(delete_todo))
        .routes(routes!(update_title))
        .routes(routes!(update_completed))
}

/// GET /todos - List all todos
#[utoipa::path(
    get,
    path = "/todos",
    tag = TODO_TAG,
    responses(
        (status = 200, description = "All todos ordered by id", body = Vec<TodoResponse>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
async fn list_todos(
    State(state): State<AppState>,
    ctx: Context,
) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    let todos = state
        .services
        .todos
        .list_todos(&ctx)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

/// POST /todos - Create a todo
#[utoipa::path(
    post,
    path = "/todos",
    tag = TODO_TAG,
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoResponse),
        (status = 400, description = "Invalid body or title", body = ErrorResponse)
    )
)]
async fn create_todo(
    State(state): State<AppState>,
    ctx: Context,
    JsonBody(payload): JsonBody<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiError> {
    let todo = state
        .services
        .todos
        .create_todo(&ctx, &payload.title)
        .await
        .map_err(ApiError::bad_request)?;
    Ok((StatusCode::CREATED, Json(TodoResponse::from(todo))))
}

/// GET /todos/{id} - Get todo by ID
#[utoipa::path(
    get,
    path = "/todos/{id}",
    tag = TODO_TAG,
    params(("id" = i64, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Todo found", body = TodoResponse),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse)
    )
)]
async fn get_todo(
    State(state): State<AppState>,
    ctx: Context,
    TodoId(id): TodoId,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo = state
        .services
        .todos
        .get_todo(&ctx, id)
        .await
        .map_err(ApiError::not_found)?;
    Ok(Json(TodoResponse::from(todo)))
}

/// DELETE /todos/{id} - Delete todo
///
/// Deleting an id that does not exist still answers 204.
#[utoipa::path(
    delete,
    path = "/todos/{id}",
    tag = TODO_TAG,
    params(("id" = i64, Path, description = "Todo id")),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, description = "Invalid id or store failure", body = ErrorResponse)
    )
)]
async fn delete_todo(
    State(state): State<AppState>,
    ctx: Context,
    TodoId(id): TodoId,
) -> Result<StatusCode, ApiError> {
    state
        .services
        .todos
        .delete_todo(&ctx, id)
        .await
        .map_err(ApiError::not_found)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /todos/{id}/title - Replace the title
#[utoipa::path(
    patch,
    path = "/todos/{id}/title",
    tag = TODO_TAG,
    params(("id" = i64, Path, description = "Todo id")),
    request_body = UpdateTitleRequest,
    responses(
        (status = 200, description = "Todo updated", body = TodoResponse),
        (status = 400, description = "Invalid id, body or title, or todo missing", body = ErrorResponse)
    )
)]
async fn update_title(
    State(state): State<AppState>,
    ctx: Context,
    TodoId(id): TodoId,
    JsonBody(payload): JsonBody<UpdateTitleRequest>,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo = state
        .services
        .todos
        .update_title(&ctx, id, &payload.title)
        .await
        .map_err(ApiError::bad_request)?;
    Ok(Json(TodoResponse::from(todo)))
}

/// PATCH /todos/{id}/completed - Set the completion flag
#[utoipa::path(
    patch,
    path = "/todos/{id}/completed",
    tag = TODO_TAG,
    params(("id" = i64, Path, description = "Todo id")),
    request_body = UpdateCompletedRequest,
    responses(
        (status = 200, description = "Todo updated", body = TodoResponse),
        (status = 400, description = "Invalid id or body, or todo missing", body = ErrorResponse)
    )
)]
async fn update_completed(
    State(state): State<AppState>,
    ctx: Context,
    TodoId(id): TodoId,
    JsonBody(payload): JsonBody<UpdateCompletedRequest>,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo = state
        .services
        .todos
        .update_completed(&ctx, id, payload.completed)
        .await
        .map_err(ApiError::bad_request)?;
    Ok(Json(TodoResponse::from(todo)))
}
