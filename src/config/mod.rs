//! Layered application configuration.
//!
//! Sources, lowest precedence first:
//! 1. `config/default.toml` (required)
//! 2. `config/{environment}.toml`
//! 3. `config/local.toml` (not committed)
//! 4. `TODO_*` environment variables, `__` between nested keys
//! 5. `DB_SOURCE`, only when `database.url` is still empty
//!
//! CLI flags are merged on top by [`crate::cli::ConfigurationMerger`].

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{DatabaseConfig, LoggerSettings, ServerConfig, Settings};
