//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use axum::{Json, Router, middleware, routing::get};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{global_error_handler, logging_middleware, request_id_middleware};
use crate::state::AppState;

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. Request ID middleware - generates/propagates request IDs
/// 2. Logging middleware - logs requests with request IDs
/// 3. Error handler - turns bodyless error responses into `{"error": ...}`
///
/// # Example
/// ```ignore
/// let state = AppState::new(pool, &settings.server, shutdown);
/// let router = create_router(state, settings.server.cors_enabled);
/// ```
pub fn create_router(state: AppState, cors_enabled: bool) -> Router {
    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(handlers::health::health_routes())
        .merge(handlers::todos::todo_routes())
        .split_for_parts();

    let router = router.route(
        OPENAPI_PATH,
        get(move || {
            let openapi = openapi.clone();
            async move { Json(openapi) }
        }),
    );

    let router = if cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
