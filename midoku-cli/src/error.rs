use midoku_library::LibraryError;
use midoku_orm::DbError;
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub(crate) fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<DbError> for CliError {
    fn from(e: DbError) -> Self {
        Self::database(e.to_string())
    }
}

impl From<LibraryError> for CliError {
    fn from(e: LibraryError) -> Self {
        match e {
            LibraryError::Db(e) => e.into(),
            other => Self::other(other.to_string()),
        }
    }
}
