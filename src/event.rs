//! Event surface of a reconnecting socket.
//!
//! Notifications are delivered over a bounded channel instead of an
//! emitter hierarchy: the wrapper composes a transport and forwards its
//! lifecycle as [`SocketEvent`] values.

use crate::error::SockError;
use bytes::Bytes;
use std::time::Duration;
use tokio::sync::mpsc;

/// Capacity of the notification channel between actor and consumer.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A lifecycle or data notification from the socket actor.
#[derive(Debug)]
pub enum SocketEvent {
    /// Transport established.
    Connected,
    /// Bytes arrived; payload passed through unchanged.
    Data(Bytes),
    /// Transport closed; carries the failure when one caused the close.
    Closed {
        had_error: bool,
        error: Option<SockError>,
    },
    /// Surfaced failure. With auto-reconnect enabled, transport failures
    /// are redirected into the retry path and never arrive here.
    Error(SockError),
    /// No data was read for the configured idle duration.
    Idle,
    /// A reconnect attempt was scheduled `wait` from now.
    ReconnectScheduled { attempt: u32, wait: Duration },
    /// Terminal teardown.
    Destroyed,
}

impl SocketEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            SocketEvent::Connected => "connect",
            SocketEvent::Data(_) => "data",
            SocketEvent::Closed { .. } => "close",
            SocketEvent::Error(_) => "error",
            SocketEvent::Idle => "idle",
            SocketEvent::ReconnectScheduled { .. } => "try_reconnect",
            SocketEvent::Destroyed => "destroy",
        }
    }
}

/// Receiving side of the notification channel.
pub struct SocketEvents {
    rx: mpsc::Receiver<SocketEvent>,
}

impl SocketEvents {
    pub(crate) fn new(rx: mpsc::Receiver<SocketEvent>) -> Self {
        Self { rx }
    }

    /// Next event, or `None` once the socket actor has stopped.
    pub async fn next(&mut self) -> Option<SocketEvent> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`next`](Self::next).
    pub fn try_next(&mut self) -> Option<SocketEvent> {
        self.rx.try_recv().ok()
    }
}
