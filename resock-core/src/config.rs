//! Configuration for the retry state machine

use std::time::Duration;

/// Retry-only configuration for [`RetryState`](crate::retry::RetryState).
///
/// Contains only the fields the backoff logic reads — transport and I/O
/// settings live in the runtime layer.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Cap on reconnect attempts before giving up
    pub max_attempts: u32,
    /// Base backoff interval; attempt k waits `base_interval * 2^k`
    pub base_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_interval: Duration::from_secs(5),
        }
    }
}
