use thiserror::Error;

/// Errors surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// The driver rejected a statement (syntax, constraint violation, I/O).
    #[error("SQLite error: {0}")]
    Driver(#[from] rusqlite::Error),

    /// A load by primary key found no row.
    #[error("{table} with id {id} not found")]
    NotFound { table: &'static str, id: i64 },

    /// A stored record's primary key was changed before saving.
    #[error("{table} record was re-keyed to {id}; primary keys of stored records are fixed")]
    PrimaryKeyChanged { table: &'static str, id: i64 },

    /// The persisted schema version is newer than this code knows about.
    #[error("Unknown database schema version {found} (newest known version is {target})")]
    SchemaVersion { found: i64, target: i64 },

    /// A schema or migration plan that cannot be applied as declared.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

pub type DbResult<T> = Result<T, DbError>;
