use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::error::AppError;

/// Utility for converting database errors to structured AppError variants.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    ///
    /// # Returns
    /// `NotFound` for an empty result, `ConnectionPool` for a dropped
    /// connection, `Database` for everything else
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.message(), operation)
            }
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    /// Same as [`convert_diesel_error`](Self::convert_diesel_error) but names
    /// the missing todo instead of a generic resource.
    pub fn convert_todo_error(error: DieselError, operation: &str, id: i64) -> AppError {
        match error {
            DieselError::NotFound => AppError::todo_not_found(id),
            other => Self::convert_diesel_error(other, operation),
        }
    }

    fn convert_database_error(kind: DatabaseErrorKind, message: &str, operation: &str) -> AppError {
        match kind {
            DatabaseErrorKind::ClosedConnection => AppError::ConnectionPool {
                source: anyhow::Error::msg(format!("connection closed: {}", message)),
            },
            DatabaseErrorKind::UniqueViolation => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("unique constraint violation: {}", message)),
            },
            DatabaseErrorKind::NotNullViolation => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("not null constraint violation: {}", message)),
            },
            DatabaseErrorKind::CheckViolation => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("check constraint violation: {}", message)),
            },
            DatabaseErrorKind::SerializationFailure => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("serialization failure: {}", message)),
            },
            _ => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(message.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDatabaseErrorInfo {
        message: String,
    }

    impl diesel::result::DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            None
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(
            kind,
            Box::new(MockDatabaseErrorInfo {
                message: message.to_string(),
            }),
        )
    }

    #[test]
    fn test_convert_not_found_error() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find");
        match result {
            AppError::NotFound { entity, field, value } => {
                assert_eq!(entity, "resource");
                assert_eq!(field, "id");
                assert_eq!(value, "unknown");
            }
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_todo_not_found_names_the_id() {
        let result =
            DatabaseErrorConverter::convert_todo_error(DieselError::NotFound, "get todo", 7);
        assert_eq!(result.to_string(), "todo with id=7 not found");
    }

    #[test]
    fn test_convert_todo_error_passes_other_errors_through() {
        let error = database_error(DatabaseErrorKind::Unknown, "syntax error at or near");
        let result = DatabaseErrorConverter::convert_todo_error(error, "update todo title", 7);
        match result {
            AppError::Database { operation, source } => {
                assert_eq!(operation, "update todo title");
                assert!(source.to_string().contains("syntax error"));
            }
            other => panic!("Expected Database error, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_closed_connection() {
        let error = database_error(DatabaseErrorKind::ClosedConnection, "server closed");
        let result = DatabaseErrorConverter::convert_diesel_error(error, "list todos");
        assert!(matches!(result, AppError::ConnectionPool { .. }));
    }

    #[test]
    fn test_convert_unique_violation() {
        let error = database_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint \"todos_pkey\"",
        );
        let result = DatabaseErrorConverter::convert_diesel_error(error, "create todo");
        match result {
            AppError::Database { operation, source } => {
                assert_eq!(operation, "create todo");
                assert!(source.to_string().starts_with("unique constraint violation"));
            }
            other => panic!("Expected Database error, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_rollback_error() {
        let result =
            DatabaseErrorConverter::convert_diesel_error(DieselError::RollbackTransaction, "seed");
        assert!(matches!(result, AppError::Database { .. }));
    }
}
