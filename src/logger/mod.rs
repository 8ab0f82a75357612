//! Logger Module
//!
//! A logging system based on `tracing-subscriber` with support for:
//! - Console output with color control
//! - File output with multiple formats (Full, Compact, JSON)
//! - Changing the level at runtime through [`LogLevelHandle`]

pub mod config;
pub mod error;

pub use config::*;
pub use error::LoggerError;

use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::sync::{Arc, Mutex};

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt,
    layer::{Layered, SubscriberExt},
    reload,
    util::SubscriberInitExt,
};

type FilteredRegistry = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Handle for swapping the active level filter after initialization.
#[derive(Clone)]
pub struct LogLevelHandle {
    pub(crate) inner: Arc<reload::Handle<EnvFilter, Registry>>,
}

impl LogLevelHandle {
    /// Replace the current filter. Accepts any `EnvFilter` directive.
    pub fn set_level(&self, level: &str) -> Result<(), LoggerError> {
        let filter = EnvFilter::try_new(level)
            .map_err(|e| LoggerError::config(format!("Invalid filter '{}': {}", level, e)))?;
        self.inner
            .reload(filter)
            .map_err(|e| LoggerError::config(e.to_string()))?;
        tracing::info!(level, "Log level changed");
        Ok(())
    }

    /// The current filter rendered as a directive string.
    pub fn current_level(&self) -> Option<String> {
        self.inner.with_current(|filter| filter.to_string()).ok()
    }
}

/// Initialize the global subscriber with the given configuration
///
/// Fails if a global subscriber is already installed.
pub fn init_logger(config: LoggerConfig) -> Result<LogLevelHandle, LoggerError> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LoggerError::config(format!("Invalid log level '{}': {}", config.level, e)))?;
    let (filter_layer, reload_handle) = reload::Layer::new(filter);

    // File layer must come before the console layer, otherwise ANSI codes
    // from the console layer leak into span fields written to the file.
    // See: https://github.com/tokio-rs/tracing/issues/1817
    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.file.enabled {
        layers.push(file_layer(&config.file)?);
    }
    if config.console.enabled {
        layers.push(console_layer(&config.console));
    }

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(layers)
        .try_init()
        .map_err(|e| LoggerError::init(e.to_string()))?;

    Ok(LogLevelHandle {
        inner: Arc::new(reload_handle),
    })
}

fn console_layer(config: &ConsoleConfig) -> BoxedLayer {
    let use_ansi = config.colored && std::io::stdout().is_terminal();

    fmt::layer()
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true)
        .boxed()
}

fn file_layer(config: &FileConfig) -> Result<BoxedLayer, LoggerError> {
    let writer = Mutex::new(open_log_file(config)?);

    let layer = match config.format {
        LogFormat::Full => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .compact()
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .boxed(),
    };

    Ok(layer)
}

/// Open (and if needed create) the log file, creating parent directories.
pub(crate) fn open_log_file(config: &FileConfig) -> Result<File, LoggerError> {
    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(config.append)
        .truncate(!config.append)
        .open(&config.path)?;

    Ok(file)
}
