//! HTTP server lifecycle: wiring, bind, serve, graceful shutdown.

use std::sync::Arc;

use anyhow::Context as _;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::api::routes::create_router;
use crate::config::{Environment, settings::Settings};
use crate::db::establish_async_connection_pool;
use crate::logger::LogLevelHandle;
use crate::state::AppState;

/// Produces the log filter to switch to, typically by reloading configuration.
pub type LevelSource = Arc<dyn Fn() -> anyhow::Result<String> + Send + Sync>;

/// Runtime log level reloading, triggered by SIGHUP.
pub struct LogReload {
    pub handle: LogLevelHandle,
    pub source: LevelSource,
}

pub struct Server {
    settings: Settings,
    environment: Environment,
    log_reload: Option<LogReload>,
}

impl Server {
    pub fn new(settings: Settings, environment: Environment) -> Self {
        Self {
            settings,
            environment,
            log_reload: None,
        }
    }

    pub fn with_log_reload(mut self, log_reload: LogReload) -> Self {
        self.log_reload = Some(log_reload);
        self
    }

    /// Serve until Ctrl+C or SIGTERM.
    ///
    /// The root cancellation token is cancelled on shutdown, so store calls
    /// still in flight end with a cancellation error.
    pub async fn run(self) -> anyhow::Result<()> {
        self.log_startup();

        let pool = establish_async_connection_pool(&self.settings.database)
            .context("Failed to create database connection pool")?;

        let shutdown = CancellationToken::new();
        let state = AppState::new(pool, &self.settings.server, shutdown.clone());
        let router = create_router(state, self.settings.server.cors_enabled);

        if let Some(log_reload) = self.log_reload {
            tokio::spawn(reload_log_level_on_hangup(log_reload, shutdown.clone()));
        }

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind to {}", address))?;
        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await
            .context("Server terminated with an error")?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    fn log_startup(&self) {
        let Settings {
            application,
            server,
            database,
            ..
        } = &self.settings;

        tracing::info!(
            app_name = %application.name,
            app_version = %application.version,
            environment = %self.environment,
            "Application starting"
        );
        tracing::info!(
            host = %server.host,
            port = server.port,
            request_timeout_secs = server.request_timeout,
            cors_enabled = server.cors_enabled,
            "Server configuration loaded"
        );
        // The URL may carry credentials; only pool sizing is logged.
        tracing::info!(
            max_connections = database.max_connections,
            min_connections = database.min_connections,
            connection_timeout_secs = database.connection_timeout,
            "Database configuration loaded"
        );
    }
}

/// Resolves on Ctrl+C or SIGTERM after cancelling `shutdown`.
async fn wait_for_shutdown(shutdown: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    tracing::info!(signal = received, "Shutdown signal received, draining connections");

    shutdown.cancel();
}

#[cfg(unix)]
async fn reload_log_level_on_hangup(log_reload: LogReload, shutdown: CancellationToken) {
    let mut hangup = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            tracing::warn!(error = %e, "SIGHUP handler unavailable, log level is fixed");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = hangup.recv() => {
                if received.is_none() {
                    break;
                }
                reload_log_level(&log_reload);
            }
        }
    }
}

#[cfg(not(unix))]
async fn reload_log_level_on_hangup(_log_reload: LogReload, _shutdown: CancellationToken) {}

/// Applies the level from `source`. The previous filter stays on failure.
fn reload_log_level(log_reload: &LogReload) -> bool {
    let previous = log_reload.handle.current_level();
    let applied = (log_reload.source)()
        .and_then(|level| log_reload.handle.set_level(&level).map_err(anyhow::Error::from));

    match applied {
        Ok(()) => {
            tracing::info!(
                previous = ?previous,
                current = ?log_reload.handle.current_level(),
                "Log level reloaded"
            );
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "Log level reload failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, reload};

    fn with_reload<R>(source: LevelSource, f: impl FnOnce(&LogReload) -> R) -> R {
        let (filter_layer, handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("info"));
        let subscriber = tracing_subscriber::registry().with(filter_layer);
        let log_reload = LogReload {
            handle: LogLevelHandle {
                inner: Arc::new(handle),
            },
            source,
        };
        tracing::subscriber::with_default(subscriber, || f(&log_reload))
    }

    #[test]
    fn test_reload_applies_level_from_source() {
        with_reload(Arc::new(|| -> anyhow::Result<String> { Ok("debug".to_string()) }), |log_reload| {
            assert!(reload_log_level(log_reload));
            assert_eq!(log_reload.handle.current_level().as_deref(), Some("debug"));
        });
    }

    #[test]
    fn test_reload_keeps_filter_when_source_fails() {
        with_reload(Arc::new(|| -> anyhow::Result<String> { Err(anyhow::anyhow!("config gone")) }), |log_reload| {
            assert!(!reload_log_level(log_reload));
            assert_eq!(log_reload.handle.current_level().as_deref(), Some("info"));
        });
    }

    #[test]
    fn test_reload_keeps_filter_when_level_is_invalid() {
        with_reload(Arc::new(|| -> anyhow::Result<String> { Ok("app=loud".to_string()) }), |log_reload| {
            assert!(!reload_log_level(log_reload));
            assert_eq!(log_reload.handle.current_level().as_deref(), Some("info"));
        });
    }
}
