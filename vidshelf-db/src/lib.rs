//! SQLite persistence layer for the video catalog.
//!
//! A [`Session`] owns one connection to the catalog database together with
//! its prepared statements and explicit-transaction state. Sessions are not
//! safe to share between threads; concurrent callers each take their own
//! Session from a [`SessionPool`].
//!
//! Every mutation is atomic: it joins the caller's explicit transaction if
//! one is active, or runs inside a short ad-hoc transaction otherwise.
//! Operations that hit transient lock contention are retried per
//! [`RetryPolicy`].

pub mod config;
pub mod error;
pub mod operations;
pub mod pool;
pub mod queries;
pub mod query;
pub mod retry;
pub mod savepoint;
pub mod schema;
pub mod session;
pub mod statements;
pub mod transaction;

pub use config::StoreConfig;
pub use error::DbError;
pub use pool::{PooledSession, SessionPool};
pub use query::QueryId;
pub use retry::{RetryPolicy, is_transient};
pub use session::{Session, StoreInfo};
