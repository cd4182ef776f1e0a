//! High-level reconnecting socket interface

use crate::actor::{run_socket_actor, SocketActor, SocketCmd};
use crate::config::{ConnectTarget, Endpoint, SocketConfig};
use crate::error::{ConnectionError, Result, SockError};
use crate::event::{SocketEvents, EVENT_CHANNEL_CAPACITY};
use crate::metrics;
use crate::transport::{TcpTransport, Transport};

use bytes::Bytes;
use resock_core::SocketState;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

// ── Payload ─────────────────────────────────────────────────────────────

/// Outbound data: UTF-8 text or raw bytes, converted at the API boundary.
#[derive(Debug, Clone)]
pub enum Payload {
    Text(String),
    Binary(Bytes),
}

impl Payload {
    /// Deterministic byte view: text becomes its UTF-8 encoding.
    pub fn into_bytes(self) -> Bytes {
        match self {
            Payload::Text(s) => Bytes::from(s.into_bytes()),
            Payload::Binary(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Payload::Text(s) => s.len(),
            Payload::Binary(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Payload::Binary(b)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::Binary(Bytes::from(b))
    }
}

impl From<&[u8]> for Payload {
    fn from(b: &[u8]) -> Self {
        Payload::Binary(Bytes::copy_from_slice(b))
    }
}

// ── SocketStats ─────────────────────────────────────────────────────────

/// Point-in-time statistics for one socket.
#[derive(Debug, Clone, Default)]
pub struct SocketStats {
    /// Current lifecycle state
    pub state: SocketState,
    /// Whether a transport is currently held
    pub connected: bool,
    /// Reconnect attempts since the last successful connect
    pub attempts: u32,
    /// Reconnect attempts scheduled over the socket's lifetime
    pub reconnects: u64,
    /// Total bytes written
    pub bytes_sent: u64,
    /// Total bytes read
    pub bytes_received: u64,
    /// Last resolved endpoint, if any
    pub endpoint: Option<Endpoint>,
}

// ── ReconnectingSocket ──────────────────────────────────────────────────

/// Clonable handle to a socket actor.
///
/// All operations go through the actor's command channel; the actor owns
/// the transport exclusively and serializes every state transition, so the
/// handle itself carries no state beyond the sender.
#[derive(Clone)]
pub struct ReconnectingSocket {
    cmd_tx: mpsc::Sender<SocketCmd>,
}

impl ReconnectingSocket {
    /// Create a socket dialing plain TCP.
    pub fn new(config: SocketConfig) -> Result<(Self, SocketEvents)> {
        Self::with_transport(TcpTransport, config)
    }

    /// Create a socket dialing through a custom transport.
    pub fn with_transport<T: Transport>(
        transport: T,
        config: SocketConfig,
    ) -> Result<(Self, SocketEvents)> {
        config.validate()?;

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let actor = SocketActor::new(transport, &config, event_tx);
        tokio::spawn(run_socket_actor(actor, cmd_rx));

        metrics::global_metrics().socket_created();

        Ok((Self { cmd_tx }, SocketEvents::new(event_rx)))
    }

    /// Dial `target`, falling back to the stored endpoint for missing
    /// fields. Returns the resolved endpoint of the attempt.
    ///
    /// With auto-reconnect enabled a failed dial still feeds the retry
    /// path; the returned error then reports the first attempt only.
    pub async fn connect(&self, target: impl Into<ConnectTarget>) -> Result<Endpoint> {
        let (reply, rx) = oneshot::channel();
        self.send_cmd(SocketCmd::Connect {
            target: target.into(),
            reply,
        })
        .await?;
        rx.await.unwrap_or_else(|_| Err(closed()))
    }

    /// Write a payload; resolves once the transport write completed.
    pub async fn send(&self, payload: impl Into<Payload>) -> Result<()> {
        let data = payload.into().into_bytes();
        let (reply, rx) = oneshot::channel();
        self.send_cmd(SocketCmd::Send { data, reply }).await?;
        rx.await.unwrap_or_else(|_| Err(closed()))
    }

    /// Arm a periodic inactivity notification: an [`Idle`] event fires
    /// after `timeout` without reads and re-arms itself afterwards.
    ///
    /// [`Idle`]: crate::event::SocketEvent::Idle
    pub async fn set_idle(&self, timeout: Duration) -> Result<()> {
        self.send_cmd(SocketCmd::SetIdle { timeout }).await
    }

    /// Toggle TCP keep-alive for subsequently dialed transports.
    pub async fn set_keep_alive(&self, enabled: bool) -> Result<()> {
        self.send_cmd(SocketCmd::SetKeepAlive { enabled }).await
    }

    /// Manually trigger the reconnect path. A no-op while an attempt is
    /// already pending.
    pub async fn reconnect(&self) -> Result<()> {
        self.send_cmd(SocketCmd::Reconnect).await
    }

    /// Snapshot of the socket's current state and counters.
    pub async fn stats(&self) -> Result<SocketStats> {
        let (reply, rx) = oneshot::channel();
        self.send_cmd(SocketCmd::Stats { reply }).await?;
        rx.await.map_err(|_| closed())
    }

    /// Whether a transport is currently established.
    pub async fn is_connected(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        if self
            .send_cmd(SocketCmd::IsConnected { reply })
            .await
            .is_err()
        {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Tear the socket down: cancels any pending reconnect, closes the
    /// transport (teardown errors swallowed), emits a final `Destroyed`
    /// event, and stops the actor. Afterwards every call on this handle
    /// fails with [`ConnectionError::Closed`].
    pub async fn destroy(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send_cmd(SocketCmd::Destroy { reply }).await?;
        let _ = rx.await;
        Ok(())
    }

    async fn send_cmd(&self, cmd: SocketCmd) -> Result<()> {
        self.cmd_tx.send(cmd).await.map_err(|_| closed())
    }
}

fn closed() -> SockError {
    SockError::connection(ConnectionError::Closed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_text_and_binary_agree() {
        let from_str = Payload::from("hello").into_bytes();
        let from_bytes = Payload::from(Bytes::from_static(b"hello")).into_bytes();
        let from_vec = Payload::from(b"hello".to_vec()).into_bytes();

        assert_eq!(from_str, from_bytes);
        assert_eq!(from_str, from_vec);
        assert_eq!(&from_str[..], &[b'h', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn test_payload_len() {
        assert_eq!(Payload::from("héllo").len(), 6);
        assert!(Payload::from("").is_empty());
    }
}
