use std::path::PathBuf;

use thiserror::Error;
use vidshelf_db::DbError;

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The catalog store rejected an operation. The root being scanned
    /// when this happened was rolled back.
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    /// A scan root does not exist or is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A scan worker thread panicked.
    #[error("Scan worker panicked")]
    WorkerPanicked,
}

/// Errors reading or writing the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
