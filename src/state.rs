//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::context::Context;
use crate::db::AsyncDbPool;
use crate::repositories::Repositories;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// This struct is designed to be used with Axum's State extractor.
/// Cloning is cheap since Services and AsyncDbPool use Arc internally.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Direct access to the database connection pool
    pub db_pool: AsyncDbPool,
    /// Deadline applied to every request context
    pub request_timeout: Duration,
    /// Root token; cancelled when the server shuts down
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Creates a new AppState backed by PostgreSQL.
    ///
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database)?;
    /// let state = AppState::new(pool, &settings.server, CancellationToken::new());
    /// ```
    pub fn new(pool: AsyncDbPool, server: &ServerConfig, shutdown: CancellationToken) -> Self {
        let repos = Repositories::new(pool.clone());
        Self::with_services(Services::new(repos), pool, server, shutdown)
    }

    /// Creates an AppState around already built services.
    pub fn with_services(
        services: Services,
        pool: AsyncDbPool,
        server: &ServerConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            services,
            db_pool: pool,
            request_timeout: Duration::from_secs(server.request_timeout),
            shutdown,
        }
    }

    /// Fresh context for one request: a child of the shutdown token with
    /// the configured deadline.
    pub fn request_context(&self) -> Context {
        Context::from_token(self.shutdown.child_token()).with_timeout(self.request_timeout)
    }
}
