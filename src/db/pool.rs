//! Async database connection pool implementation.
//!
//! Uses bb8 connection pool manager with diesel_async for PostgreSQL connections.

use std::time::Duration;

use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::config::DatabaseConfig;
use crate::context::Context;
use crate::error::AppError;

/// Async connection pool type alias.
///
/// bb8::Pool internally uses Arc, so Clone is cheap (just reference count increment).
/// Structures holding AsyncDbPool can derive Clone without additional Arc wrapping.
pub type AsyncDbPool = Pool<AsyncPgConnection>;

/// Creates an async database connection pool from the `[database]` settings.
///
/// The settings are validated first; a bad value comes back as
/// [`AppError::Configuration`] naming the offending key.
///
/// The pool is built lazily: no connection is opened here, so a server can
/// start while PostgreSQL is still coming up. The first store call (or the
/// readiness check) surfaces connection problems.
///
/// # Example
///
/// ```ignore
/// let pool = establish_async_connection_pool(&settings.database)?;
/// let mut conn = pool.get().await?;
/// ```
pub fn establish_async_connection_pool(config: &DatabaseConfig) -> Result<AsyncDbPool, AppError> {
    config.validate()?;

    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.clone());
    let pool = Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .build_unchecked(manager);

    tracing::debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        connection_timeout_secs = config.connection_timeout,
        "Database pool configured"
    );

    Ok(pool)
}

/// Runs `SELECT 1` through the pool within `ctx`.
pub async fn ping(pool: &AsyncDbPool, ctx: &Context) -> Result<(), AppError> {
    ctx.run(async {
        let mut conn = pool.get().await?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok::<_, AppError>(())
    })
    .await
}
