//! Health check DTOs for API responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Readiness check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "timestamp": "2025-06-01T12:00:00Z",
    "database": {
        "status": "healthy",
        "message": "Connected",
        "response_time_ms": 5
    }
}))]
pub struct HealthResponse {
    /// Overall health status
    pub status: HealthStatus,
    /// Application version
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Time of the check
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: jiff::Timestamp,
    /// Result of the `SELECT 1` check
    pub database: ComponentHealth,
}

/// Health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health information.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    /// Optional message with details
    pub message: Option<String>,
    /// Response time in milliseconds
    pub response_time_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(serde_json::to_string(&HealthStatus::Healthy).unwrap(), "\"healthy\"");
        assert_eq!(serde_json::to_string(&HealthStatus::Unhealthy).unwrap(), "\"unhealthy\"");
    }
}
