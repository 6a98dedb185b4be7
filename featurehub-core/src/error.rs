/// Structured error types for featurehub-core.
///
/// Library callers get composable `thiserror` errors; the `featurehub`
/// binary wraps them in `anyhow` with command context.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for admin operations
#[derive(Error, Debug)]
pub enum AdminError {
    /// Statement, connection, or transaction failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Creating or dropping the physical database failed
    #[error("database lifecycle error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// The configured database has not been created yet
    #[error("database '{name}' does not exist; create it with `featurehub setup`")]
    DatabaseMissing { name: String },

    /// A problem document could not be parsed into a problem
    #[error("invalid problem document {path:?}: {source}")]
    Document {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// A problem failed alignment or table reference checks
    #[error("invalid problem '{name}': {reason}")]
    InvalidProblem { name: String, reason: String },

    /// A JSON-text column could not be encoded or decoded
    #[error("column '{column}' is malformed: {source}")]
    Column {
        column: &'static str,
        source: serde_json::Error,
    },

    /// Configuration error
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

/// Result type alias for featurehub-core operations
pub type Result<T> = std::result::Result<T, AdminError>;

impl AdminError {
    /// Create a document parse error
    pub fn document(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Document {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid problem error
    pub fn invalid_problem(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProblem {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a column codec error
    pub fn column(column: &'static str, source: serde_json::Error) -> Self {
        Self::Column { column, source }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdminError::invalid_problem("p1", "files and table_names differ in length");
        assert_eq!(
            err.to_string(),
            "invalid problem 'p1': files and table_names differ in length"
        );

        let err = AdminError::DatabaseMissing {
            name: "featurehub".into(),
        };
        assert!(err.to_string().contains("featurehub setup"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let admin_err: AdminError = io_err.into();

        assert!(matches!(admin_err, AdminError::Io { .. }));
    }
}
