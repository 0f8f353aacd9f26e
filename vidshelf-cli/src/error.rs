use thiserror::Error;
use vidshelf_db::DbError;
use vidshelf_lib::{ScanError, SettingsError};

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Catalog store operation failed
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Scan aborted
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    /// Settings file could not be read or written
    #[error("Config error: {0}")]
    Settings(#[from] SettingsError),

    /// An id or name given on the command line matched nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// A command-line value could not be interpreted
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
