//! A single connection to the catalog database.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use rusqlite::{Connection, Row, Statement, ToSql};

use crate::config::StoreConfig;
use crate::error::DbError;
use crate::query::QueryId;
use crate::retry::RetryPolicy;
use crate::schema;
use crate::statements::StatementCache;
use crate::transaction::{self, TransactionController};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

const MAINTENANCE_SQL: [&str; 4] = [
    "PRAGMA wal_checkpoint(TRUNCATE)",
    "VACUUM",
    "REINDEX",
    "ANALYZE",
];

/// One open connection with its statement cache and transaction state.
///
/// A Session must only be used by one thread at a time. Open several
/// Sessions (or use a [`SessionPool`](crate::SessionPool)) for concurrency.
#[derive(Debug)]
pub struct Session {
    id: u64,
    path: PathBuf,
    conn: Connection,
    retry: RetryPolicy,
    statements: StatementCache,
    tx: TransactionController,
}

/// Engine-level facts about an open store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInfo {
    pub schema_version: i32,
    pub journal_mode: String,
    pub foreign_keys: bool,
    pub page_size: i64,
    pub page_count: i64,
    pub tables: Vec<String>,
}

impl Session {
    /// Open the database at `path` with default settings, creating the file
    /// and its schema if the store has no schema yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        Self::open_with(path, &StoreConfig::default())
    }

    pub fn open_with(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Self, DbError> {
        Self::open_with_schema(path.as_ref(), config, &schema::SCHEMA_SQL)
    }

    fn open_with_schema(
        path: &Path,
        config: &StoreConfig,
        ddl: &[&str],
    ) -> Result<Self, DbError> {
        let existed = path.try_exists()?;
        let conn = Connection::open(path)
            .map_err(|e| DbError::query("Open", path.display().to_string(), e))?;
        StatementCache::attach(&conn);

        let session = Session {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            path: path.to_path_buf(),
            conn,
            retry: config.retry_policy(),
            statements: StatementCache::new(),
            tx: TransactionController::new(),
        };
        log::debug!("Session {}: opened {}", session.id, path.display());

        if let Err(err) = session.prepare_store(config, ddl) {
            log::error!(
                "Session {}: cannot set up {}: {}",
                session.id,
                path.display(),
                err
            );
            if let Err(close_err) = session.close() {
                log::error!("Failed to close {}: {}", path.display(), close_err);
            }
            if !existed {
                schema::remove_store_files(path)?;
            }
            return Err(err);
        }
        Ok(session)
    }

    fn prepare_store(&self, config: &StoreConfig, ddl: &[&str]) -> Result<(), DbError> {
        schema::configure(&self.conn, config, &self.retry)?;
        let version = self
            .retry
            .run("SchemaVersion", || schema::schema_version(&self.conn))?;
        if version != 0 {
            return Ok(());
        }
        schema::initialize_with(&self.conn, &self.retry, ddl).map_err(|source| DbError::Init {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("Session {}: created schema v{}", self.id, schema::CURRENT_VERSION);
        Ok(())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True while an explicit transaction is active on the connection.
    pub fn in_transaction(&self) -> bool {
        self.tx.is_active() && !self.conn.is_autocommit()
    }

    /// Number of registry statements prepared on this connection so far.
    pub fn prepared_statements(&self) -> usize {
        self.statements.len()
    }

    pub fn is_prepared(&self, id: QueryId) -> bool {
        self.statements.is_prepared(id)
    }

    /// Number of savepoints alive in the current explicit transaction.
    pub fn savepoint_depth(&self) -> usize {
        self.tx.savepoint_depth()
    }

    // ── Transactions ────────────────────────────────────────────────────

    pub fn begin(&mut self) -> Result<(), DbError> {
        self.tx.begin(&self.conn, &self.retry)?;
        log::debug!("Session {}: begin", self.id);
        Ok(())
    }

    pub fn commit(&mut self) -> Result<(), DbError> {
        self.tx.commit(&self.conn, &self.retry)?;
        log::debug!("Session {}: commit", self.id);
        Ok(())
    }

    pub fn rollback(&mut self) -> Result<(), DbError> {
        self.tx.rollback(&self.conn, &self.retry)?;
        log::debug!("Session {}: rollback", self.id);
        Ok(())
    }

    /// Run `f` inside an explicit transaction, committing on `Ok` and
    /// rolling back on `Err`.
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&mut Self) -> Result<T, DbError>,
    {
        self.begin()?;
        match f(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(err) => {
                match self.rollback() {
                    Ok(()) | Err(DbError::TxAborted) => {}
                    Err(rb) => log::error!("Session {}: rollback failed: {}", self.id, rb),
                }
                Err(err)
            }
        }
    }

    pub fn savepoint_create(&mut self, name: &str) -> Result<(), DbError> {
        self.tx.savepoint_create(&self.conn, &self.retry, name)?;
        log::debug!("Session {}: savepoint {:?}", self.id, name);
        Ok(())
    }

    pub fn savepoint_release(&mut self, name: &str) -> Result<(), DbError> {
        self.tx.savepoint_release(&self.conn, &self.retry, name)?;
        log::debug!("Session {}: release savepoint {:?}", self.id, name);
        Ok(())
    }

    pub fn savepoint_rollback(&mut self, name: &str) -> Result<(), DbError> {
        self.tx.savepoint_rollback(&self.conn, &self.retry, name)?;
        log::debug!("Session {}: rollback to savepoint {:?}", self.id, name);
        Ok(())
    }

    // ── Housekeeping ────────────────────────────────────────────────────

    /// Checkpoint the WAL, compact the file, rebuild indexes and refresh
    /// planner statistics.
    ///
    /// Every step is attempted; the first failure is returned.
    pub fn perform_maintenance(&mut self) -> Result<(), DbError> {
        if self.tx.check(&self.conn)? {
            return Err(DbError::TxInProgress);
        }
        let mut first_error = None;
        for sql in MAINTENANCE_SQL {
            log::debug!("Session {}: {}", self.id, sql);
            if let Err(e) = self.retry.run(sql, || self.conn.execute_batch(sql)) {
                let err = fail(self.id, "PerformMaintenance", sql, e);
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Prepare every registry statement, validating the SQL against the
    /// schema.
    pub fn prepare_all(&mut self) -> Result<usize, DbError> {
        for id in QueryId::ALL {
            self.run_statement(id, "registry", |_| Ok(()))?;
        }
        Ok(self.statements.len())
    }

    pub fn info(&self) -> Result<StoreInfo, DbError> {
        let pragma_i64 = |name: &str| -> rusqlite::Result<i64> {
            self.conn.pragma_query_value(None, name, |row| row.get(0))
        };
        let journal_mode: String = self
            .conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))?;
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let tables = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(StoreInfo {
            schema_version: schema::schema_version(&self.conn)?,
            journal_mode,
            foreign_keys: pragma_i64("foreign_keys")? != 0,
            page_size: pragma_i64("page_size")?,
            page_count: pragma_i64("page_count")?,
            tables,
        })
    }

    /// Roll back any pending explicit transaction, finalize cached
    /// statements and close the connection.
    ///
    /// The connection is always closed; a rollback failure is reported
    /// after that.
    pub fn close(self) -> Result<(), DbError> {
        let Session {
            id,
            path,
            conn,
            retry,
            mut statements,
            mut tx,
        } = self;

        let mut pending = Ok(());
        if tx.is_active() {
            log::debug!("Session {}: rolling back pending transaction", id);
            pending = match tx.rollback(&conn, &retry) {
                Err(DbError::TxAborted) => Ok(()),
                other => other,
            };
            if let Err(e) = &pending {
                log::error!("Session {}: rollback on close failed: {}", id, e);
            }
        }

        statements.clear(&conn);
        conn.close().map_err(|(_, e)| DbError::Close(e))?;
        log::debug!("Session {}: closed {}", id, path.display());
        pending
    }

    // ── Statement plumbing ──────────────────────────────────────────────

    /// Run `f` against the cached statement for `id`, retrying transient
    /// failures. `target` names the affected entity in errors.
    pub(crate) fn run_statement<T, F>(
        &mut self,
        id: QueryId,
        target: &str,
        mut f: F,
    ) -> Result<T, DbError>
    where
        F: FnMut(&mut Statement<'_>) -> rusqlite::Result<T>,
    {
        let session = self.id;
        let (mut stmt, fresh) = self
            .statements
            .prepare(&self.conn, &self.retry, id)
            .map_err(|e| fail(session, id.name(), target, e))?;
        if fresh {
            log::debug!("Session {}: prepared {}", session, id);
        }
        self.retry
            .run(id.name(), || f(&mut *stmt))
            .map_err(|e| fail(session, id.name(), target, e))
    }

    /// Run `f` inside the active explicit transaction, or inside an ad-hoc
    /// transaction that is committed on success and rolled back on failure.
    ///
    /// An explicit transaction the engine has already rolled back fails with
    /// `TxAborted`; `f` never runs in autocommit mode in its place.
    pub(crate) fn within_transaction<T, F>(
        &mut self,
        op: &'static str,
        target: &str,
        f: F,
    ) -> Result<T, DbError>
    where
        F: FnOnce(&mut Self) -> Result<T, DbError>,
    {
        if self.tx.check(&self.conn)? {
            return f(self);
        }

        transaction::begin_immediate(&self.conn, &self.retry)
            .map_err(|e| fail(self.id, op, target, e))?;
        let result = f(self);
        let finished = match &result {
            Ok(_) => transaction::commit(&self.conn, &self.retry),
            Err(_) => transaction::rollback(&self.conn, &self.retry),
        };

        match (result, finished) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => {
                let err = fail(self.id, op, target, e);
                if let Err(rb) = transaction::rollback(&self.conn, &self.retry) {
                    log::error!("Session {}: rollback after failed commit: {}", self.id, rb);
                }
                Err(err)
            }
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(rb)) => {
                log::error!("Session {}: ad-hoc rollback failed: {}", self.id, rb);
                Err(err)
            }
        }
    }

    /// Execute a mutation, returning the number of changed rows.
    pub(crate) fn execute(
        &mut self,
        id: QueryId,
        target: &str,
        params: &[&dyn ToSql],
    ) -> Result<usize, DbError> {
        debug_assert!(id.is_mutation(), "{id} is not a mutation");
        self.within_transaction(id.name(), target, |s| {
            s.run_statement(id, target, |stmt| stmt.execute(params))
        })
    }

    /// Execute an INSERT, returning the new row id.
    pub(crate) fn insert(
        &mut self,
        id: QueryId,
        target: &str,
        params: &[&dyn ToSql],
    ) -> Result<i64, DbError> {
        debug_assert!(id.is_mutation(), "{id} is not a mutation");
        self.within_transaction(id.name(), target, |s| {
            s.run_statement(id, target, |stmt| stmt.insert(params))
        })
    }

    /// Fetch at most one row. No match is `Ok(None)`.
    pub(crate) fn query_optional<T, M>(
        &mut self,
        id: QueryId,
        target: &str,
        params: &[&dyn ToSql],
        map: M,
    ) -> Result<Option<T>, DbError>
    where
        M: Fn(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.run_statement(id, target, |stmt| match stmt.query_row(params, &map) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        })
    }

    pub(crate) fn query_all<T, M>(
        &mut self,
        id: QueryId,
        target: &str,
        params: &[&dyn ToSql],
        map: M,
    ) -> Result<Vec<T>, DbError>
    where
        M: Fn(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.run_statement(id, target, |stmt| {
            stmt.query_map(params, &map)?.collect::<rusqlite::Result<Vec<T>>>()
        })
    }
}

/// Annotate and log a terminal engine error.
fn fail(session: u64, op: &'static str, target: &str, source: rusqlite::Error) -> DbError {
    let err = DbError::query(op, target, source);
    log::error!("Session {}: {}", session, err);
    err
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use tempfile::TempDir;

    use super::*;

    fn sidecar(path: &Path, suffix: &str) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    /// A session whose store can grow by only a few pages.
    fn nearly_full() -> (TempDir, Session, vidshelf_catalog::Folder) {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path().join("catalog.db")).unwrap();
        let folder = session.folder_add(Path::new("/videos")).unwrap();
        let pages: i64 = session
            .conn
            .pragma_query_value(None, "page_count", |row| row.get(0))
            .unwrap();
        session
            .conn
            .pragma_update(None, "max_page_count", pages + 3)
            .unwrap();
        (dir, session, folder)
    }

    fn oversized_path() -> PathBuf {
        PathBuf::from(format!("/videos/{}.mp4", "x".repeat(200_000)))
    }

    #[test]
    fn engine_abort_refuses_further_work() {
        let (_dir, mut s, folder) = nearly_full();
        s.begin().unwrap();
        let err = s.file_add(&oversized_path(), &folder).unwrap_err();
        assert!(!err.is_constraint());
        assert!(!s.in_transaction());

        let err = s.file_add(Path::new("/videos/small.mp4"), &folder).unwrap_err();
        assert!(matches!(err, DbError::TxAborted));
        assert!(err.is_protocol());
        assert!(matches!(s.rollback(), Err(DbError::NoTxInProgress)));
        assert!(s.file_get_all().unwrap().is_empty());

        // Outside a transaction the session works normally again.
        s.file_add(Path::new("/videos/small.mp4"), &folder).unwrap();
        assert_eq!(s.file_get_all().unwrap().len(), 1);
    }

    #[test]
    fn rollback_reports_engine_abort() {
        let (_dir, mut s, folder) = nearly_full();
        s.begin().unwrap();
        assert!(s.file_add(&oversized_path(), &folder).is_err());
        assert!(matches!(s.rollback(), Err(DbError::TxAborted)));

        s.begin().unwrap();
        s.savepoint_create("a").unwrap();
        s.rollback().unwrap();
        assert!(s.file_get_all().unwrap().is_empty());
    }

    #[test]
    fn savepoints_refused_after_engine_abort() {
        let (_dir, mut s, folder) = nearly_full();
        s.begin().unwrap();
        s.savepoint_create("before").unwrap();
        assert!(s.file_add(&oversized_path(), &folder).is_err());
        assert!(matches!(
            s.savepoint_rollback("before"),
            Err(DbError::TxAborted)
        ));
        assert_eq!(s.savepoint_depth(), 0);
        assert!(matches!(s.commit(), Err(DbError::NoTxInProgress)));
        s.close().unwrap();
    }

    #[test]
    fn close_after_engine_abort_succeeds() {
        let (_dir, mut s, folder) = nearly_full();
        s.begin().unwrap();
        assert!(s.file_add(&oversized_path(), &folder).is_err());
        s.close().unwrap();
    }

    #[test]
    fn failed_initialization_removes_new_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let ddl = [schema::SCHEMA_SQL[0], "CREATE TABLE broken ("];

        let err = Session::open_with_schema(&path, &StoreConfig::default(), &ddl).unwrap_err();
        assert!(matches!(err, DbError::Init { .. }));
        for suffix in ["", "-wal", "-shm", "-journal"] {
            assert!(!sidecar(&path, suffix).exists(), "{suffix:?} left behind");
        }

        let session = Session::open(&path).unwrap();
        assert_eq!(session.info().unwrap().schema_version, schema::CURRENT_VERSION);
    }

    #[test]
    fn failed_initialization_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        std::fs::write(&path, b"").unwrap();
        let ddl = [schema::SCHEMA_SQL[0], "CREATE TABLE broken ("];

        let err = Session::open_with_schema(&path, &StoreConfig::default(), &ddl).unwrap_err();
        assert!(matches!(err, DbError::Init { .. }));
        assert!(path.exists());
    }
}
