//! Serve command handler
//!
//! Handles the serve command including dry-run validation and server startup.

use anyhow::Context as _;

use crate::config::{Environment, settings::Settings};
use crate::server::{LogReload, Server};

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
    environment: Environment,
    log_reload: Option<LogReload>,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, environment: Environment) -> Self {
        Self {
            config,
            environment,
            log_reload: None,
        }
    }

    pub fn with_log_reload(mut self, log_reload: LogReload) -> Self {
        self.log_reload = Some(log_reload);
        self
    }

    /// Start the server, or with `dry_run` only validate and print the
    /// effective settings.
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            return self.validate_only();
        }

        let mut server = Server::new(self.config, self.environment);
        if let Some(log_reload) = self.log_reload {
            server = server.with_log_reload(log_reload);
        }
        server.run().await
    }

    /// Validate configuration without starting the server
    pub fn validate_only(&self) -> anyhow::Result<()> {
        self.config
            .validate()
            .context("Configuration is invalid")?;

        let rendered = serde_json::to_string_pretty(&self.config)
            .context("Failed to render configuration")?;

        println!("Environment: {}", self.environment.as_str());
        println!("Server would bind to: {}", self.config.server.address());
        println!("{}", rendered);
        println!("Dry run completed successfully");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_valid_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/test".to_string();
        config
    }

    #[test]
    fn test_serve_handler_new() {
        let config = create_valid_config();
        let handler = ServeCommandHandler::new(config.clone(), Environment::Test);
        assert_eq!(handler.config(), &config);
    }

    #[tokio::test]
    async fn test_serve_handler_dry_run() {
        let handler = ServeCommandHandler::new(create_valid_config(), Environment::Test);
        assert!(handler.execute(true).await.is_ok());
    }

    #[tokio::test]
    async fn test_serve_handler_dry_run_invalid_config() {
        let mut config = create_valid_config();
        config.server.port = 0;
        let handler = ServeCommandHandler::new(config, Environment::Test);
        assert!(handler.execute(true).await.is_err());
    }
}
