//! # resock — reconnecting TCP sockets for Tokio
//!
//! A long-lived outbound TCP connection that survives transient network
//! failures: the socket redials automatically with exponential backoff and
//! reports its lifecycle over an event channel.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │  resock-tokio  (this crate)            │
//! │                                        │
//! │  ReconnectingSocket       ← user API   │
//! │  actor                    ← scheduler  │
//! │  transport                ← TCP dial   │
//! ├────────────────────────────────────────┤
//! │  resock-core  (dependency)             │
//! │                                        │
//! │  RetryState   ← backoff schedule       │
//! │  SocketState  ← transition table       │
//! └────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resock_tokio::{SocketConfig, SocketEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (socket, mut events) = SocketConfig::resilient()
//!         .host("127.0.0.1")
//!         .port(9000)
//!         .connect()
//!         .await?;
//!
//!     socket.send("hello").await?;
//!
//!     while let Some(event) = events.next().await {
//!         match event {
//!             SocketEvent::Data(bytes) => println!("received {} bytes", bytes.len()),
//!             SocketEvent::ReconnectScheduled { attempt, wait } => {
//!                 println!("retry {} in {:?}", attempt, wait);
//!             }
//!             SocketEvent::Destroyed => break,
//!             _ => {}
//!         }
//!     }
//!
//!     socket.destroy().await?;
//!     Ok(())
//! }
//! ```

// ── Layer 1: Core state machine (re-exported from resock-core) ──────────

/// Direct access to the standalone `resock-core` crate.
pub use resock_core;

pub use resock_core::{RetryConfig, RetryState, SocketState};

// ── Layer 2: Transport & runtime infrastructure ─────────────────────────

pub mod buffer_pool;
pub mod transport;
pub use transport::{ConnectOpts, TcpTransport, Transport};

// ── Layer 3: Configuration & errors ─────────────────────────────────────

pub mod config;
pub mod error;
pub use config::{ConnectTarget, Endpoint, SocketConfig};
pub use error::{ConnectionError, Result, SockError};

// ── Layer 4: Async socket (actor + handle + events) ─────────────────────

pub(crate) mod actor;
pub mod event;
pub mod socket;

pub use event::{SocketEvent, SocketEvents};
pub use socket::{Payload, ReconnectingSocket, SocketStats};

pub mod metrics;

// ── Version info ────────────────────────────────────────────────────────

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
