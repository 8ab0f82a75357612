use utoipa::OpenApi;

pub const TODO_TAG: &str = "Todos";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "todo-service",
        description = "CRUD API for todo items",
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
        )
    ),
    tags(
        (name = TODO_TAG, description = "Todo item endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
