//! Explicit transaction state and savepoint handling for one connection.
//!
//! Transactions are driven with raw `BEGIN IMMEDIATE` / `COMMIT` /
//! `ROLLBACK` so the controller can live next to the connection it drives
//! inside a [`Session`](crate::Session).

use rusqlite::Connection;

use crate::error::DbError;
use crate::retry::RetryPolicy;
use crate::savepoint::SavepointNamespace;

/// Tracks whether an explicit transaction is active and owns the savepoint
/// namespace scoped to it.
#[derive(Debug, Default)]
pub struct TransactionController {
    active: bool,
    savepoints: SavepointNamespace,
}

impl TransactionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while an explicit transaction is registered. The engine may
    /// have left it already; [`check`](Self::check) finds out.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Reconcile the controller with the connection.
    ///
    /// Returns `Ok(true)` inside a live explicit transaction and `Ok(false)`
    /// when idle. If the engine rolled the transaction back behind our back,
    /// the controller goes idle and `TxAborted` is returned.
    pub fn check(&mut self, conn: &Connection) -> Result<bool, DbError> {
        if !self.active {
            return Ok(false);
        }
        if conn.is_autocommit() {
            log::warn!("Transaction was rolled back by the engine");
            self.active = false;
            self.savepoints.reset();
            return Err(DbError::TxAborted);
        }
        Ok(true)
    }

    /// Number of savepoints currently registered.
    pub fn savepoint_depth(&self) -> usize {
        self.savepoints.len()
    }

    pub fn begin(&mut self, conn: &Connection, retry: &RetryPolicy) -> Result<(), DbError> {
        if self.check(conn)? {
            return Err(DbError::TxInProgress);
        }
        begin_immediate(conn, retry).map_err(|e| DbError::query("Begin", "transaction", e))?;
        self.active = true;
        self.savepoints.reset();
        Ok(())
    }

    pub fn commit(&mut self, conn: &Connection, retry: &RetryPolicy) -> Result<(), DbError> {
        if !self.check(conn)? {
            return Err(DbError::NoTxInProgress);
        }
        let result = commit(conn, retry);
        self.finish(conn);
        result.map_err(|e| DbError::query("Commit", "transaction", e))
    }

    pub fn rollback(&mut self, conn: &Connection, retry: &RetryPolicy) -> Result<(), DbError> {
        if !self.check(conn)? {
            return Err(DbError::NoTxInProgress);
        }
        let result = rollback(conn, retry);
        self.finish(conn);
        result.map_err(|e| DbError::query("Rollback", "transaction", e))
    }

    /// Settle the state after COMMIT or ROLLBACK. A failed COMMIT can leave
    /// the engine inside the transaction, so the connection decides.
    fn finish(&mut self, conn: &Connection) {
        self.active = !conn.is_autocommit();
        self.savepoints.reset();
    }

    pub fn savepoint_create(
        &mut self,
        conn: &Connection,
        retry: &RetryPolicy,
        name: &str,
    ) -> Result<(), DbError> {
        if !self.check(conn)? {
            return Err(DbError::NoTxInProgress);
        }
        let internal = self.savepoints.allocate();
        let sql = format!("SAVEPOINT {internal}");
        retry
            .run("SavepointCreate", || conn.execute_batch(&sql))
            .map_err(|e| DbError::query("SavepointCreate", name, e))?;
        self.savepoints.push(name, internal);
        Ok(())
    }

    pub fn savepoint_release(
        &mut self,
        conn: &Connection,
        retry: &RetryPolicy,
        name: &str,
    ) -> Result<(), DbError> {
        if !self.check(conn)? {
            return Err(DbError::NoTxInProgress);
        }
        let (index, internal) = self
            .savepoints
            .lookup(name)
            .ok_or_else(|| DbError::UnknownSavepoint(name.to_string()))?;
        let sql = format!("RELEASE {internal}");
        retry
            .run("SavepointRelease", || conn.execute_batch(&sql))
            .map_err(|e| DbError::query("SavepointRelease", name, e))?;
        self.savepoints.unregister(index);
        Ok(())
    }

    pub fn savepoint_rollback(
        &mut self,
        conn: &Connection,
        retry: &RetryPolicy,
        name: &str,
    ) -> Result<(), DbError> {
        if !self.check(conn)? {
            return Err(DbError::NoTxInProgress);
        }
        let (index, internal) = self
            .savepoints
            .lookup(name)
            .ok_or_else(|| DbError::UnknownSavepoint(name.to_string()))?;
        // ROLLBACK TO keeps the savepoint on the engine's stack.
        let rollback_sql = format!("ROLLBACK TO {internal}");
        let release_sql = format!("RELEASE {internal}");
        retry
            .run("SavepointRollback", || conn.execute_batch(&rollback_sql))
            .and_then(|()| retry.run("SavepointRollback", || conn.execute_batch(&release_sql)))
            .map_err(|e| DbError::query("SavepointRollback", name, e))?;
        self.savepoints.unregister(index);
        Ok(())
    }
}

/// Open a write transaction. Used for explicit and ad-hoc transactions.
pub(crate) fn begin_immediate(conn: &Connection, retry: &RetryPolicy) -> rusqlite::Result<()> {
    retry.run("Begin", || conn.execute_batch("BEGIN IMMEDIATE"))
}

pub(crate) fn commit(conn: &Connection, retry: &RetryPolicy) -> rusqlite::Result<()> {
    retry.run("Commit", || conn.execute_batch("COMMIT"))
}

/// Roll back whatever transaction the connection is in. A connection that
/// already left the transaction (the engine rolls back on some errors) is
/// not an error.
pub(crate) fn rollback(conn: &Connection, retry: &RetryPolicy) -> rusqlite::Result<()> {
    if conn.is_autocommit() {
        return Ok(());
    }
    retry.run("Rollback", || conn.execute_batch("ROLLBACK"))
}
