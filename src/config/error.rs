//! Errors raised while locating, parsing or validating configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A loaded value is out of range or malformed. `field` is the dotted key.
    #[error("Validation error: {field} - {message}")]
    ValidationError { field: String, message: String },

    #[error("Invalid environment {0}")]
    InvalidEnvironment(String),

    /// `TODO_CONFIG_DIR` and `TODO_CONFIG_FILE` were both set.
    #[error("Mutual exclusivity error: {0}")]
    MutualExclusivityError(String),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError(message.into())
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn mutual_exclusivity(message: impl Into<String>) -> Self {
        Self::MutualExclusivityError(message.into())
    }

    /// Dotted key the error refers to, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ValidationError { field, .. } => Some(field),
            _ => None,
        }
    }
}
