//! Health check endpoint handlers.
//!
//! `/` and `/healthz` answer without touching any dependency. The
//! readiness check runs `SELECT 1` through the connection pool.

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::context::Context;
use crate::db;
use crate::state::AppState;

pub const GREETING: &str = "Hello, Docker Environment!";

const READINESS_TIMEOUT: Duration = Duration::from_secs(2);

/// Creates health check routes.
///
/// # Routes
/// - `GET /` - Greeting
/// - `GET /healthz` - Liveness check
/// - `GET /health/ready` - Readiness check
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(greeting))
        .routes(routes!(liveness_check))
        .routes(routes!(readiness_check))
}

/// Plain-text greeting.
#[utoipa::path(
    get,
    path = "/",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Greeting", body = String, content_type = "text/plain")
    )
)]
pub async fn greeting() -> &'static str {
    GREETING
}

/// Liveness check endpoint.
///
/// If we can respond, we're alive.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is alive", body = String, content_type = "text/plain")
    )
)]
pub async fn liveness_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint.
///
/// # Responses
/// - `200 OK` - Database reachable
/// - `503 Service Unavailable` - Database unreachable
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Service is not ready", body = HealthResponse)
    )
)]
pub async fn readiness_check(
    State(state): State<AppState>,
    ctx: Context,
) -> (StatusCode, Json<HealthResponse>) {
    let database = check_database(&state, &ctx.with_timeout(READINESS_TIMEOUT)).await;

    let status = match database.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = HealthResponse {
        status: database.status,
        version: crate::pkg_version().to_string(),
        timestamp: jiff::Timestamp::now(),
        database,
    };

    (status, Json(response))
}

async fn check_database(state: &AppState, ctx: &Context) -> ComponentHealth {
    let start_time = std::time::Instant::now();

    match db::ping(&state.db_pool, ctx).await {
        Ok(()) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some("Connected".to_string()),
            response_time_ms: Some(start_time.elapsed().as_millis() as u64),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                message: Some(e.to_string()),
                response_time_ms: Some(start_time.elapsed().as_millis() as u64),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness_check() {
        assert_eq!(liveness_check().await, "OK");
    }

    #[tokio::test]
    async fn test_greeting() {
        assert_eq!(greeting().await, GREETING);
    }
}
