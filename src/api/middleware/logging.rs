//! Logging middleware for request/response tracing.
//!
//! This middleware logs incoming requests and outgoing responses with
//! timing information and request correlation via request IDs.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, Level, info, span};

use super::RequestId;

/// Middleware that logs request and response information.
///
/// Everything the handler logs lands inside the `http_request` span, so
/// service and repository events carry the request ID too.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let span = span!(
        Level::INFO,
        "http_request",
        method = %method,
        path = %uri.path(),
        request_id = %request_id
    );

    async move {
        info!("Request received");

        let start = Instant::now();
        let response = next.run(request).await;
        let duration = start.elapsed();

        info!(
            status = response.status().as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Response sent"
        );

        response
    }
    .instrument(span)
    .await
}
