//! Error types for reconnecting sockets.
//!
//! [`SockError`] extends [`resock_core::CoreError`] with I/O, argument,
//! and configuration variants needed by the async runtime layer.

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SockError>;

// ── Error types ─────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum SockError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bad argument to connect: {message}")]
    BadArgument { message: String },

    #[error("Connection error: {kind}")]
    Connection { kind: ConnectionError },

    #[error("Did not reconnect after maximum retries: {attempts}")]
    RetryExhausted { attempts: u32 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    Closed,
    Refused,
    Reset,
    Lost,
    NotConnected,
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "connection closed"),
            Self::Refused => write!(f, "connection refused"),
            Self::Reset => write!(f, "connection reset by peer"),
            Self::Lost => write!(f, "connection lost"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

// ── Bridge: core errors → SockError ─────────────────────────────────────

impl From<resock_core::CoreError> for SockError {
    fn from(e: resock_core::CoreError) -> Self {
        match e {
            resock_core::CoreError::RetryExhausted { attempts } => Self::RetryExhausted { attempts },
            resock_core::CoreError::InvalidTransition { .. } => Self::Internal {
                message: e.to_string(),
            },
        }
    }
}

// ── Constructors ────────────────────────────────────────────────────────

impl SockError {
    pub fn bad_argument(message: impl Into<String>) -> Self {
        Self::BadArgument { message: message.into() }
    }

    pub fn connection(kind: ConnectionError) -> Self {
        Self::Connection { kind }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

// ── Predicates ──────────────────────────────────────────────────────────

impl SockError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
            ),
            Self::Connection { kind } => matches!(kind, ConnectionError::Lost),
            _ => false,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::RetryExhausted { .. }
                | Self::BadArgument { .. }
                | Self::Config { .. }
                | Self::Internal { .. }
        )
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Self::Connection { kind } => matches!(
                kind,
                ConnectionError::Closed | ConnectionError::Reset | ConnectionError::Refused
            ),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}
