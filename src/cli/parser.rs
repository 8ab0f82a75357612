//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Todo CRUD service over HTTP and PostgreSQL
#[derive(Parser, Debug, Clone)]
#[command(name = "todo-service")]
#[command(about = "Todo CRUD service over HTTP and PostgreSQL")]
#[command(long_about = "
todo-service exposes create, read, update and delete operations on todo items
as a JSON HTTP API backed by PostgreSQL.

EXAMPLES:
    # Start the server with default configuration
    todo-service

    # Start server on custom host and port
    todo-service serve --host 0.0.0.0 --port 8080

    # Use custom configuration file
    todo-service --config /path/to/config.toml serve

    # Check configuration without starting server
    todo-service serve --dry-run

    # Insert the sample todos
    todo-service seed
")]
#[command(version = crate::build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load this single TOML file instead of the layered `config/` directory.
    /// `TODO_*` environment variables still apply on top of it.
    ///
    /// Example: --config /etc/todo-service/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `config/{environment}.toml` overlay is loaded.
    /// Takes precedence over `TODO_APP_ENV`.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the web server (default)
    ///
    /// Examples:
    ///   todo-service serve                           # Start with defaults
    ///   todo-service serve --host 0.0.0.0 --port 80 # Bind to all interfaces on port 80
    ///   todo-service serve --dry-run                 # Validate config without starting
    Serve {
        /// Host address to bind to
        ///
        /// Default: 127.0.0.1
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        ///
        /// Default: 8000
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override
        ///
        /// Overrides both the configuration file and the global --verbose/--quiet flags.
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration, print the effective settings and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Insert the sample todos in a single transaction
    Seed {
        /// List the sample todos without touching the database
        #[arg(long)]
        dry_run: bool,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// Environment selected by `--env`, falling back to `TODO_APP_ENV`.
    pub fn environment(&self) -> crate::config::Environment {
        self.env
            .map(Into::into)
            .unwrap_or_else(crate::config::Environment::from_env)
    }

    /// Re-check flag combinations for `Cli` values built without clap.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        Ok(())
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error".to_string(),
            LogLevel::Warn => "warn".to_string(),
            LogLevel::Info => "info".to_string(),
            LogLevel::Debug => "debug".to_string(),
            LogLevel::Trace => "trace".to_string(),
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}
