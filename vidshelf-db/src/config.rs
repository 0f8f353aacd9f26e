//! Tunables for opening sessions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Default delay between attempts of an operation that hit lock contention.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 25;

/// Per-session storage settings.
///
/// `busy_timeout_ms` is handed to the engine's own busy handler. It defaults
/// to zero so that contention surfaces immediately and is handled by the
/// [`RetryPolicy`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub retry_delay_ms: u64,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            busy_timeout_ms: 0,
        }
    }
}

impl StoreConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(self.retry_delay_ms))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
