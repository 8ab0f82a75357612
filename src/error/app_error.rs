use diesel_async::pooled_connection::PoolError;
use thiserror::Error;

use crate::config::error::ConfigError;
use crate::error::DatabaseErrorConverter;

/// Coarse classification of an [`AppError`].
///
/// Handlers never branch on this; it exists for logging and for callers
/// that want to tell caller mistakes apart from missing rows and outages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or semantically invalid caller input
    InvalidArgument,
    /// No matching row
    NotFound,
    /// Unexpected store, transport or runtime failure
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Application-wide error type.
///
/// The `Display` text is what ends up in the `{"error": ...}` body, so it
/// carries the underlying message but no backtraces or connection details.
#[derive(Error, Debug)]
pub enum AppError {
    /// Caller input rejected before touching the store
    #[error("{message}")]
    InvalidArgument { field: String, message: String },

    /// No row matched the lookup
    #[error("{entity} with {field}={value} not found")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Database operation error with operation context
    #[error("database operation failed: {operation}: {source}")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Connection pool could not hand out a connection
    #[error("database connection unavailable: {source}")]
    ConnectionPool {
        #[source]
        source: anyhow::Error,
    },

    /// The execution context was cancelled while a store call was outstanding
    #[error("request cancelled")]
    Cancelled,

    /// The execution context deadline elapsed while a store call was outstanding
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// Configuration error with key information
    #[error("configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("internal error: {source}")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn todo_not_found(id: i64) -> Self {
        AppError::NotFound {
            entity: "todo".to_string(),
            field: "id".to_string(),
            value: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::Database { .. }
            | AppError::ConnectionPool { .. }
            | AppError::Cancelled
            | AppError::DeadlineExceeded
            | AppError::Configuration { .. }
            | AppError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseErrorConverter::convert_diesel_error(error, "database operation")
    }
}

impl From<PoolError> for AppError {
    fn from(error: PoolError) -> Self {
        AppError::ConnectionPool {
            source: anyhow::Error::from(error),
        }
    }
}

impl From<bb8::RunError<PoolError>> for AppError {
    fn from(error: bb8::RunError<PoolError>) -> Self {
        AppError::ConnectionPool {
            source: anyhow::Error::from(error),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let key = error.field().unwrap_or("settings").to_string();
        AppError::Configuration {
            key,
            source: anyhow::Error::from(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_displays_bare_message() {
        let error = AppError::invalid_argument("id", "invalid id");
        assert_eq!(error.to_string(), "invalid id");
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_todo_not_found() {
        let error = AppError::todo_not_found(42);
        assert_eq!(error.to_string(), "todo with id=42 not found");
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_internal_kinds() {
        let errors = [
            AppError::Database {
                operation: "list todos".to_string(),
                source: anyhow::anyhow!("connection reset"),
            },
            AppError::ConnectionPool {
                source: anyhow::anyhow!("timed out"),
            },
            AppError::Cancelled,
            AppError::DeadlineExceeded,
            AppError::from(anyhow::anyhow!("boom")),
        ];
        for error in errors {
            assert_eq!(error.kind(), ErrorKind::Internal, "{error}");
        }
    }

    #[test]
    fn test_database_display_keeps_underlying_text() {
        let error = AppError::Database {
            operation: "create todo".to_string(),
            source: anyhow::anyhow!("relation \"todos\" does not exist"),
        };
        assert_eq!(
            error.to_string(),
            "database operation failed: create todo: relation \"todos\" does not exist"
        );
    }

    #[test]
    fn test_config_error_conversion_keeps_field() {
        let error = AppError::from(ConfigError::validation("server.port", "bad port"));
        match error {
            AppError::Configuration { key, .. } => assert_eq!(key, "server.port"),
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_kind_as_str() {
        assert_eq!(ErrorKind::InvalidArgument.as_str(), "invalid_argument");
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(ErrorKind::Internal.as_str(), "internal");
    }
}
