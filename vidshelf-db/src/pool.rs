//! A pool that hands out whole [`Session`]s to concurrent callers.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::config::StoreConfig;
use crate::error::DbError;
use crate::session::Session;

/// Free list of idle Sessions against one database file.
///
/// Each caller gets exclusive use of a Session until its [`PooledSession`]
/// guard is dropped.
#[derive(Debug)]
pub struct SessionPool {
    path: PathBuf,
    config: StoreConfig,
    max_idle: usize,
    free: Mutex<Vec<Session>>,
}

impl SessionPool {
    /// Create a pool for `path`. One Session is opened right away so that the
    /// schema exists before concurrent callers arrive.
    pub fn new(
        path: impl AsRef<Path>,
        config: StoreConfig,
        max_idle: usize,
    ) -> Result<Self, DbError> {
        let path = path.as_ref().to_path_buf();
        let first = Session::open_with(&path, &config)?;
        Ok(Self {
            path,
            config,
            max_idle: max_idle.max(1),
            free: Mutex::new(vec![first]),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of idle Sessions on the free list.
    pub fn idle(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Take an idle Session, or open a new one if none is free.
    pub fn acquire(&self) -> Result<PooledSession<'_>, DbError> {
        let reused = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let session = match reused {
            Some(session) => session,
            None => Session::open_with(&self.path, &self.config)?,
        };
        log::trace!("Session {} acquired from pool", session.id());
        Ok(PooledSession {
            pool: self,
            session: Some(session),
        })
    }

    fn release(&self, mut session: Session) {
        match session.rollback() {
            Ok(()) => log::debug!(
                "Session {} returned with an open transaction, rolled back",
                session.id()
            ),
            Err(DbError::NoTxInProgress) => {}
            Err(DbError::TxAborted) => {
                log::debug!("Session {} returned after an aborted transaction", session.id())
            }
            Err(e) => {
                log::error!("Discarding session {}: {}", session.id(), e);
                return;
            }
        }

        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.max_idle {
            free.push(session);
            return;
        }
        drop(free);

        let id = session.id();
        if let Err(e) = session.close() {
            log::error!("Failed to close surplus session {}: {}", id, e);
        }
    }

    /// Close every idle Session. Sessions currently handed out are closed
    /// when they come back and the pool is full, or when dropped.
    pub fn close(&self) -> Result<(), DbError> {
        let sessions: Vec<Session> = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        let mut first_error = None;
        for session in sessions {
            if let Err(e) = session.close() {
                log::error!("Failed to close pooled session: {}", e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Exclusive use of one [`Session`] from a [`SessionPool`].
///
/// The Session goes back to the pool when the guard is dropped.
#[derive(Debug)]
pub struct PooledSession<'pool> {
    pool: &'pool SessionPool,
    session: Option<Session>,
}

impl Deref for PooledSession<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        match &self.session {
            Some(session) => session,
            None => unreachable!("session taken before drop"),
        }
    }
}

impl DerefMut for PooledSession<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        match &mut self.session {
            Some(session) => session,
            None => unreachable!("session taken before drop"),
        }
    }
}

impl Drop for PooledSession<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.pool.release(session);
        }
    }
}
