//! Connection lifecycle states and the transition table

use crate::error::{CoreError, CoreResult};
use std::fmt;

/// Lifecycle state of a reconnecting socket.
///
/// ```text
/// Idle → Connecting → Connected → {Closed, Errored}
///              ↑                        │ (auto-reconnect)
///              └── ReconnectScheduled ←─┘
///                        │
///                        └→ Failed   (retries exhausted)
/// ```
///
/// `Destroyed` is reachable from every state and is terminal. All moves go
/// through [`transition`](Self::transition) so illegal ones are rejected by
/// a single table instead of scattered flag checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SocketState {
    /// Created, never connected
    #[default]
    Idle,
    /// A dial is in flight
    Connecting,
    /// Transport established
    Connected,
    /// Transport closed without an error
    Closed,
    /// Transport failed
    Errored,
    /// A backoff timer is pending
    ReconnectScheduled,
    /// Retries exhausted; no automatic attempts remain
    Failed,
    /// Torn down; terminal
    Destroyed,
}

impl SocketState {
    /// Whether the transition table permits moving to `to`.
    pub fn can_transition(self, to: SocketState) -> bool {
        use SocketState::*;

        // Teardown wins from anywhere, including an already-destroyed
        // socket (idempotent destroy).
        if to == Destroyed {
            return true;
        }

        match self {
            Idle => matches!(to, Connecting | ReconnectScheduled),
            Connecting => matches!(to, Connecting | Connected | Closed | Errored | ReconnectScheduled),
            Connected => matches!(to, Connecting | Closed | Errored | ReconnectScheduled),
            Closed => matches!(to, Connecting | ReconnectScheduled),
            Errored => matches!(to, Connecting | ReconnectScheduled),
            ReconnectScheduled => matches!(to, Connecting | Failed),
            Failed => matches!(to, Connecting),
            Destroyed => false,
        }
    }

    /// Apply a transition, rejecting moves the table forbids.
    pub fn transition(&mut self, to: SocketState) -> CoreResult<()> {
        if !self.can_transition(to) {
            return Err(CoreError::InvalidTransition { from: *self, to });
        }
        *self = to;
        Ok(())
    }

    /// Terminal teardown state.
    pub fn is_destroyed(self) -> bool {
        self == SocketState::Destroyed
    }
}

impl fmt::Display for SocketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketState::Idle => write!(f, "idle"),
            SocketState::Connecting => write!(f, "connecting"),
            SocketState::Connected => write!(f, "connected"),
            SocketState::Closed => write!(f, "closed"),
            SocketState::Errored => write!(f, "errored"),
            SocketState::ReconnectScheduled => write!(f, "reconnect scheduled"),
            SocketState::Failed => write!(f, "failed"),
            SocketState::Destroyed => write!(f, "destroyed"),
        }
    }
}
