//! Abstract stream transport.
//!
//! The [`Transport`] trait lets the reconnecting socket dial over any async
//! byte stream, not just TCP. [`TcpTransport`] is the built-in
//! implementation backed by `tokio::net::TcpStream`.

use crate::config::Endpoint;
use std::future::Future;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};

/// Options applied while establishing a stream.
#[derive(Debug, Clone, Default)]
pub struct ConnectOpts {
    /// Enable TCP keep-alive on the new socket.
    pub keep_alive: bool,
    /// Disable Nagle's algorithm on the established stream.
    pub nodelay: bool,
}

/// Async stream dialer used by the socket actor.
///
/// Each reconnect cycle calls [`connect`](Self::connect) again, so an
/// implementation is a factory for transport handles rather than a handle
/// itself. The actor owns at most one [`Io`](Self::Io) at a time and fully
/// tears the previous one down before dialing a replacement.
pub trait Transport: Send + Sync + 'static {
    /// The established stream type.
    type Io: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Establish a fresh stream to `endpoint`.
    fn connect<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        opts: &'a ConnectOpts,
    ) -> impl Future<Output = io::Result<Self::Io>> + Send + 'a;
}

// ---------------------------------------------------------------------------
// TcpTransport — default implementation backed by tokio::net::TcpStream
// ---------------------------------------------------------------------------

mod tcp {
    use super::*;
    use std::net::SocketAddr;
    use tokio::net::{lookup_host, TcpSocket, TcpStream};

    /// Default [`Transport`] dialing plain TCP.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct TcpTransport;

    impl Transport for TcpTransport {
        type Io = TcpStream;

        async fn connect(&self, endpoint: &Endpoint, opts: &ConnectOpts) -> io::Result<TcpStream> {
            let mut last_err = None;

            for addr in lookup_host((endpoint.host.as_str(), endpoint.port)).await? {
                let socket = match addr {
                    SocketAddr::V4(_) => TcpSocket::new_v4()?,
                    SocketAddr::V6(_) => TcpSocket::new_v6()?,
                };
                socket.set_keepalive(opts.keep_alive)?;

                match socket.connect(addr).await {
                    Ok(stream) => {
                        stream.set_nodelay(opts.nodelay)?;
                        return Ok(stream);
                    }
                    Err(e) => last_err = Some(e),
                }
            }

            Err(last_err.unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "host resolved to no addresses",
                )
            }))
        }
    }
}

pub use tcp::TcpTransport;
