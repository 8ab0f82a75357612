//! Command-line interface
//!
//! Argument parsing, merging CLI overrides into the loaded configuration,
//! and dispatching the `serve` and `seed` commands.

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use anyhow::Context as _;

use crate::config::settings::Settings;
use crate::logger::{LogLevelHandle, init_logger};

/// Load configuration files, then apply CLI overrides and validate.
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let merger = ConfigurationMerger::from_config_path(cli.config.as_deref(), cli.environment())
        .context("Configuration error")?;

    merger
        .merge_cli_args(cli)
        .context("Configuration merge error")
}

/// Install the global subscriber described by `settings.logger`.
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<LogLevelHandle> {
    let logger_config = settings
        .logger
        .clone()
        .into_logger_config()
        .context("Logger configuration error")?;

    init_logger(logger_config).context("Logger initialization error")
}
