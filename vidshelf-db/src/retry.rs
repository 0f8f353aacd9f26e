//! Retrying operations that fail on transient lock contention.
//!
//! SQLite allows a single writer at a time. When another connection holds
//! the write lock, statements fail with "database is locked" (or "busy").
//! Those failures are expected to clear within milliseconds, so the
//! operation is repeated after a short fixed delay, without a ceiling.
//! Every other error is terminal and handed back on the first attempt.

use std::thread;
use std::time::Duration;

use rusqlite::ErrorCode;

use crate::config::DEFAULT_RETRY_DELAY_MS;

/// Returns true if the error indicates transient lock contention.
pub fn is_transient(err: &rusqlite::Error) -> bool {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    ) {
        return true;
    }
    let text = err.to_string().to_lowercase();
    text.contains("database is locked") || text.contains("database is busy")
}

/// Fixed-delay, unbounded retry of transiently failing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_RETRY_DELAY_MS))
    }
}

impl RetryPolicy {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `op` until it succeeds or fails with a non-transient error.
    ///
    /// `what` names the operation in trace output.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> rusqlite::Result<T>
    where
        F: FnMut() -> rusqlite::Result<T>,
    {
        let mut attempt: u64 = 0;
        loop {
            match op() {
                Err(e) if is_transient(&e) => {
                    attempt += 1;
                    log::trace!(
                        "{} hit lock contention (attempt {}), retrying in {:?}",
                        what,
                        attempt,
                        self.delay
                    );
                    thread::sleep(self.delay);
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rusqlite::ffi;

    use super::*;

    fn failure(code: i32, msg: Option<&str>) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), msg.map(str::to_string))
    }

    #[test]
    fn busy_and_locked_codes_are_transient() {
        assert!(is_transient(&failure(ffi::SQLITE_BUSY, None)));
        assert!(is_transient(&failure(ffi::SQLITE_LOCKED, None)));
    }

    #[test]
    fn message_pattern_is_case_insensitive() {
        let err = rusqlite::Error::InvalidParameterName("Database Is Locked".to_string());
        assert!(is_transient(&err));
        let err = rusqlite::Error::InvalidParameterName("DATABASE IS BUSY".to_string());
        assert!(is_transient(&err));
    }

    #[test]
    fn constraint_failures_are_terminal() {
        let err = failure(
            ffi::SQLITE_CONSTRAINT,
            Some("UNIQUE constraint failed: file.path"),
        );
        assert!(!is_transient(&err));
        assert!(!is_transient(&rusqlite::Error::QueryReturnedNoRows));
    }

    #[test]
    fn run_retries_until_success() {
        let policy = RetryPolicy::new(Duration::from_millis(1));
        let calls = Cell::new(0);
        let result = policy.run("test", || {
            calls.set(calls.get() + 1);
            if calls.get() < 4 {
                Err(failure(ffi::SQLITE_BUSY, Some("database is locked")))
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn run_returns_terminal_error_immediately() {
        let policy = RetryPolicy::new(Duration::from_millis(1));
        let calls = Cell::new(0);
        let result: rusqlite::Result<()> = policy.run("test", || {
            calls.set(calls.get() + 1);
            Err(rusqlite::Error::QueryReturnedNoRows)
        });
        assert!(matches!(result, Err(rusqlite::Error::QueryReturnedNoRows)));
        assert_eq!(calls.get(), 1);
    }
}
