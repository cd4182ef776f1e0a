//! Exponential backoff bookkeeping for reconnect attempts

use crate::config::RetryConfig;
use crate::error::{CoreError, CoreResult};
use std::time::Duration;

/// Tracks reconnect attempts and the single outstanding backoff timer.
///
/// The caller owns the actual timer; this type only decides whether one may
/// be scheduled and how long it should wait. The `waiting` flag guarantees
/// at most one timer is pending at any time: [`schedule`](Self::schedule)
/// sets it and [`fire`](Self::fire) clears it.
#[derive(Debug, Clone)]
pub struct RetryState {
    config: RetryConfig,
    attempts: u32,
    waiting: bool,
}

impl RetryState {
    /// Create fresh retry state with no attempts recorded.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            attempts: 0,
            waiting: false,
        }
    }

    /// Number of attempts scheduled since the last successful connect.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// True while a scheduled backoff timer is pending.
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// The configuration this state was built with.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Backoff delay for a 0-indexed attempt: `base_interval * 2^attempt`.
    ///
    /// Saturates instead of overflowing for large attempt numbers.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.config.base_interval.saturating_mul(factor)
    }

    /// Request the next reconnect attempt.
    ///
    /// Returns `None` while a timer is already pending, so concurrent
    /// triggers collapse into the one scheduled attempt. Otherwise records
    /// the attempt and returns the delay to wait before dialing.
    pub fn schedule(&mut self) -> Option<Duration> {
        if self.waiting {
            return None;
        }
        let wait = self.backoff_for(self.attempts);
        self.attempts += 1;
        self.waiting = true;
        Some(wait)
    }

    /// The scheduled timer fired.
    ///
    /// Clears the waiting flag. Returns [`CoreError::RetryExhausted`] once
    /// the attempt counter has reached the configured maximum; after that
    /// the caller must not schedule again.
    pub fn fire(&mut self) -> CoreResult<()> {
        self.waiting = false;
        if self.attempts >= self.config.max_attempts {
            return Err(CoreError::RetryExhausted {
                attempts: self.attempts,
            });
        }
        Ok(())
    }

    /// Abandon the pending timer, if any, without recording an attempt.
    ///
    /// Used when an explicit connect supersedes a scheduled reconnect.
    pub fn cancel(&mut self) {
        self.waiting = false;
    }

    /// A connection attempt succeeded: reset all retry bookkeeping.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.waiting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let state = RetryState::new(RetryConfig::default());
        assert_eq!(state.backoff_for(0), Duration::from_millis(5000));
        assert_eq!(state.backoff_for(1), Duration::from_millis(10000));
        assert_eq!(state.backoff_for(2), Duration::from_millis(20000));
    }

    #[test]
    fn test_backoff_saturates() {
        let state = RetryState::new(RetryConfig::default());
        // Shift width exceeds u32: must not panic, must stay huge
        assert!(state.backoff_for(40) > Duration::from_secs(86400));
    }
}
