//! Configuration merger for CLI arguments and config files
//!
//! CLI arguments override values loaded from configuration files and
//! environment variables.

use std::path::Path;

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, settings::Settings};

/// Applies CLI overrides on top of file-based configuration
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration, either from `config_path` alone or from
    /// the layered configuration directory. Validation happens in
    /// [`ConfigurationMerger::merge_cli_args`].
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn from_config_path(
        config_path: Option<&Path>,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?.with_environment(environment);
        if let Some(path) = config_path {
            loader = loader.with_config_file(path);
        }

        Ok(Self::new(loader.load_unvalidated()?))
    }

    /// Apply CLI overrides and validate the result
    ///
    /// Command-specific flags win over global ones. `seed --dry-run` never
    /// connects, so `[database]` is not checked for it.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            ..
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(level) = log_level {
                config.logger.level = (*level).into();
            }
        }

        if matches!(cli.command, Some(Commands::Seed { dry_run: true })) {
            config.validate_without_database()?;
        } else {
            config.validate()?;
        }

        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn merger() -> ConfigurationMerger {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/test".to_string();
        ConfigurationMerger::new(config)
    }

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        merger().merge_cli_args(&cli)
    }

    #[test]
    fn test_no_flags_keeps_base_config() {
        let merged = merge(&["todo-service"]).unwrap();
        assert_eq!(&merged, merger().config());
    }

    #[test]
    fn test_verbose_and_quiet_flags() {
        assert_eq!(merge(&["todo-service", "--verbose"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["todo-service", "--quiet"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_serve_overrides_host_and_port() {
        let merged = merge(&["todo-service", "serve", "--host", "0.0.0.0", "--port", "9000"]).unwrap();
        assert_eq!(merged.server.host, "0.0.0.0");
        assert_eq!(merged.server.port, 9000);
    }

    #[test]
    fn test_command_log_level_overrides_global() {
        let merged =
            merge(&["todo-service", "--verbose", "serve", "--log-level", "warn"]).unwrap();
        assert_eq!(merged.logger.level, "warn");
    }

    #[test]
    fn test_seed_leaves_server_untouched() {
        let merged = merge(&["todo-service", "seed"]).unwrap();
        assert_eq!(merged.server, merger().config().server);
    }

    #[test]
    fn test_invalid_base_config_is_rejected() {
        let cli = Cli::try_parse_from(["todo-service"]).unwrap();
        let result = ConfigurationMerger::new(Settings::default()).merge_cli_args(&cli);
        assert!(result.is_err());
    }

    #[test]
    fn test_seed_dry_run_does_not_require_database_url() {
        let base = ConfigurationMerger::new(Settings::default());

        let dry_run = Cli::try_parse_from(["todo-service", "seed", "--dry-run"]).unwrap();
        assert!(base.merge_cli_args(&dry_run).is_ok());

        let seed = Cli::try_parse_from(["todo-service", "seed"]).unwrap();
        let err = base.merge_cli_args(&seed).unwrap_err();
        assert_eq!(err.field(), Some("database.url"));
    }
}
