//! Error types for the core state machine

use crate::state::SocketState;
use std::fmt;

/// Result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Errors produced by the core state machine.
///
/// This is intentionally minimal — only the 2 variants the state logic actually produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A state change the transition table forbids
    InvalidTransition { from: SocketState, to: SocketState },
    /// Reconnect attempts exceeded the configured maximum
    RetryExhausted { attempts: u32 },
}

impl CoreError {
    /// Check if this is a fatal error that should stop all further attempts
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::RetryExhausted { .. })
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidTransition { from, to } => {
                write!(f, "invalid state transition: {from} -> {to}")
            }
            CoreError::RetryExhausted { attempts } => {
                write!(f, "Did not reconnect after maximum retries: {attempts}")
            }
        }
    }
}

impl std::error::Error for CoreError {}
