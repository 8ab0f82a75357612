//! Command executor for dispatching CLI commands

use std::sync::Arc;

use super::handlers::{SeedCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::logger::LogLevelHandle;
use crate::server::{LevelSource, LogReload};

/// Run the parsed command; `serve` is the default when none is given.
///
/// With a `log_handle`, a running server re-reads `logger.level` from the
/// same configuration sources on SIGHUP.
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    log_handle: Option<LogLevelHandle>,
) -> anyhow::Result<()> {
    cli.validate().map_err(anyhow::Error::msg)?;

    let dry_run = match &cli.command {
        Some(Commands::Seed { dry_run }) => {
            return SeedCommandHandler::new(settings).execute(*dry_run).await;
        }
        Some(Commands::Serve { dry_run, .. }) => *dry_run,
        None => false,
    };

    let mut handler = ServeCommandHandler::new(settings, cli.environment());
    if let Some(handle) = log_handle {
        handler = handler.with_log_reload(LogReload {
            handle,
            source: level_source(cli.clone()),
        });
    }
    handler.execute(dry_run).await
}

fn level_source(cli: Cli) -> LevelSource {
    Arc::new(move || -> anyhow::Result<String> {
        Ok(super::load_and_merge_config(&cli)?.logger.level)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn create_valid_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/test".to_string();
        config
    }

    #[tokio::test]
    async fn test_execute_serve_dry_run() {
        let cli = Cli::try_parse_from(["todo-service", "serve", "--dry-run"]).unwrap();
        assert!(execute_command(&cli, create_valid_config(), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_execute_seed_dry_run() {
        let cli = Cli::try_parse_from(["todo-service", "seed", "--dry-run"]).unwrap();
        assert!(execute_command(&cli, create_valid_config(), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_execute_rejects_conflicting_flags() {
        let cli = Cli {
            command: Some(Commands::Seed { dry_run: true }),
            config: None,
            env: None,
            verbose: true,
            quiet: true,
        };
        assert!(execute_command(&cli, create_valid_config(), None).await.is_err());
    }
}
