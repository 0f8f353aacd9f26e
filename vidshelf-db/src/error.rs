use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors returned by the storage layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// `begin` (or maintenance) was called while an explicit transaction is active.
    #[error("A transaction is already in progress")]
    TxInProgress,

    /// `commit`, `rollback` or a savepoint operation was called while idle.
    #[error("There is no transaction in progress")]
    NoTxInProgress,

    /// The savepoint name was never created in this transaction, or has
    /// already been released or rolled back.
    #[error("Unknown savepoint {0:?}")]
    UnknownSavepoint(String),

    /// The engine rolled the explicit transaction back on its own (disk
    /// full, I/O error, out of memory). The Session is idle again.
    #[error("The transaction was aborted by the database engine")]
    TxAborted,

    /// A unique, foreign-key or check constraint rejected the statement.
    #[error("{op} {target}: constraint violation: {source}")]
    Constraint {
        op: &'static str,
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Any other terminal error from the engine.
    #[error("{op} {target}: {source}")]
    Query {
        op: &'static str,
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Creating the schema of a fresh database failed.
    #[error("Cannot initialize database at {}: {source}", path.display())]
    Init {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A half-initialized database file could not be removed. The on-disk
    /// state is unknown after this.
    #[error("Cannot remove database file {}: {source}", path.display())]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Closing the connection failed.
    #[error("Cannot close database: {0}")]
    Close(#[source] rusqlite::Error),

    /// Paths are stored as text and must be valid UTF-8.
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl DbError {
    /// Annotate an engine error with the operation and its target, sorting
    /// constraint violations into their own variant.
    pub fn query(op: &'static str, target: impl Into<String>, source: rusqlite::Error) -> Self {
        let target = target.into();
        if source.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
            Self::Constraint {
                op,
                target,
                source,
            }
        } else {
            Self::Query { op, target, source }
        }
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint { .. })
    }

    /// True for caller logic errors around transactions and savepoints.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::TxInProgress
                | Self::NoTxInProgress
                | Self::UnknownSavepoint(_)
                | Self::TxAborted
        )
    }
}
