//! Per-connection prepared statement cache keyed by [`QueryId`].

use std::collections::BTreeSet;

use rusqlite::{CachedStatement, Connection};

use crate::query::QueryId;
use crate::retry::RetryPolicy;

/// Lazily prepares one statement per query identifier.
///
/// Statements live in the connection's own LRU cache, sized so that no
/// registry statement is ever evicted. This type records which identifiers
/// have been prepared so far.
#[derive(Debug, Default)]
pub struct StatementCache {
    prepared: BTreeSet<QueryId>,
}

impl StatementCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the connection's statement cache to hold every registry query.
    pub fn attach(conn: &Connection) {
        conn.set_prepared_statement_cache_capacity(QueryId::ALL.len());
    }

    /// Fetch the cached statement for `id`, preparing it on first use.
    ///
    /// Returns the statement and whether this call prepared it.
    pub fn prepare<'conn>(
        &mut self,
        conn: &'conn Connection,
        retry: &RetryPolicy,
        id: QueryId,
    ) -> rusqlite::Result<(CachedStatement<'conn>, bool)> {
        let stmt = retry.run(id.name(), || conn.prepare_cached(id.sql()))?;
        let fresh = self.prepared.insert(id);
        Ok((stmt, fresh))
    }

    pub fn is_prepared(&self, id: QueryId) -> bool {
        self.prepared.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.prepared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prepared.is_empty()
    }

    /// Finalize every cached statement.
    pub fn clear(&mut self, conn: &Connection) {
        conn.flush_prepared_statement_cache();
        self.prepared.clear();
    }
}
