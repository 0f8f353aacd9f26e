//! SQLite schema creation and connection setup.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::config::StoreConfig;
use crate::error::DbError;
use crate::retry::RetryPolicy;

/// Current schema version, recorded in `PRAGMA user_version`.
pub const CURRENT_VERSION: i32 = 1;

/// Names of all tables created by [`initialize`].
pub const TABLES: [&str; 8] = [
    "folder",
    "file",
    "person",
    "person_url",
    "tag",
    "tag_link",
    "actor",
    "director",
];

/// Apply the per-connection settings every session relies on.
pub fn configure(
    conn: &Connection,
    config: &StoreConfig,
    retry: &RetryPolicy,
) -> Result<(), DbError> {
    conn.busy_timeout(config.busy_timeout())?;
    retry
        .run("configure", || conn.execute_batch(CONNECTION_PRAGMAS))
        .map_err(DbError::Sqlite)?;
    Ok(())
}

/// Create all tables and indexes inside a single transaction.
///
/// This is idempotent: safe to call on an existing database.
pub fn initialize(conn: &Connection, retry: &RetryPolicy) -> rusqlite::Result<()> {
    initialize_with(conn, retry, &SCHEMA_SQL)
}

pub(crate) fn initialize_with(
    conn: &Connection,
    retry: &RetryPolicy,
    ddl: &[&str],
) -> rusqlite::Result<()> {
    let tx = retry.run("initialize", || {
        Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
    })?;
    for statement in ddl {
        log::trace!("Execute init query:\n{}", statement);
        tx.execute_batch(statement)?;
    }
    tx.pragma_update(None, "user_version", CURRENT_VERSION)?;
    tx.commit()
}

/// Read the schema version, or 0 for a database without a schema.
pub fn schema_version(conn: &Connection) -> rusqlite::Result<i32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Remove a database file together with its WAL and shared-memory sidecars.
pub fn remove_store_files(path: &Path) -> Result<(), DbError> {
    let mut candidates = vec![path.to_path_buf()];
    for suffix in ["-wal", "-shm", "-journal"] {
        let mut name = OsString::from(path.as_os_str());
        name.push(suffix);
        candidates.push(PathBuf::from(name));
    }

    for candidate in candidates {
        match std::fs::remove_file(&candidate) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(DbError::RemoveFailed {
                    path: candidate,
                    source,
                });
            }
        }
    }
    Ok(())
}

const CONNECTION_PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA locking_mode = NORMAL;
PRAGMA foreign_keys = ON;
PRAGMA recursive_triggers = OFF;
";

pub(crate) const SCHEMA_SQL: [&str; 12] = [
    "
CREATE TABLE IF NOT EXISTS folder (
    id INTEGER PRIMARY KEY,
    path TEXT UNIQUE NOT NULL,
    last_scan INTEGER NOT NULL DEFAULT 0
)",
    "
CREATE TABLE IF NOT EXISTS file (
    id INTEGER PRIMARY KEY,
    folder_id INTEGER NOT NULL,
    path TEXT UNIQUE NOT NULL,
    title TEXT,
    year INTEGER,
    hidden BOOLEAN NOT NULL DEFAULT 0,
    FOREIGN KEY (folder_id) REFERENCES folder (id)
        ON DELETE RESTRICT
        ON UPDATE RESTRICT,
    CHECK (year IS NULL OR year > 1900)
)",
    "CREATE INDEX IF NOT EXISTS idx_file_folder ON file (folder_id)",
    "
CREATE TABLE IF NOT EXISTS person (
    id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    birthday INTEGER NOT NULL DEFAULT 0
)",
    "
CREATE TABLE IF NOT EXISTS person_url (
    id INTEGER PRIMARY KEY,
    person_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    title TEXT,
    description TEXT,
    FOREIGN KEY (person_id) REFERENCES person (id)
        ON DELETE RESTRICT
        ON UPDATE RESTRICT
)",
    "
CREATE TABLE IF NOT EXISTS tag (
    id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL
)",
    "
CREATE TABLE IF NOT EXISTS tag_link (
    id INTEGER PRIMARY KEY,
    file_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    FOREIGN KEY (file_id) REFERENCES file (id)
        ON DELETE RESTRICT
        ON UPDATE RESTRICT,
    FOREIGN KEY (tag_id) REFERENCES tag (id)
        ON DELETE RESTRICT
        ON UPDATE RESTRICT,
    UNIQUE (file_id, tag_id)
)",
    "CREATE INDEX IF NOT EXISTS idx_tag_link_tag ON tag_link (tag_id)",
    "
CREATE TABLE IF NOT EXISTS actor (
    id INTEGER PRIMARY KEY,
    file_id INTEGER NOT NULL,
    person_id INTEGER NOT NULL,
    FOREIGN KEY (file_id) REFERENCES file (id)
        ON DELETE RESTRICT
        ON UPDATE RESTRICT,
    FOREIGN KEY (person_id) REFERENCES person (id)
        ON DELETE RESTRICT
        ON UPDATE RESTRICT,
    UNIQUE (file_id, person_id)
)",
    "CREATE INDEX IF NOT EXISTS idx_actor_person ON actor (person_id)",
    "
CREATE TABLE IF NOT EXISTS director (
    id INTEGER PRIMARY KEY,
    file_id INTEGER NOT NULL,
    person_id INTEGER NOT NULL,
    FOREIGN KEY (file_id) REFERENCES file (id)
        ON DELETE RESTRICT
        ON UPDATE RESTRICT,
    FOREIGN KEY (person_id) REFERENCES person (id)
        ON DELETE RESTRICT
        ON UPDATE RESTRICT,
    UNIQUE (file_id, person_id)
)",
    "CREATE INDEX IF NOT EXISTS idx_director_person ON director (person_id)",
];
