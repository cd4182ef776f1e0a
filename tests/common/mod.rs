//! Shared test helpers for socket integration tests

use resock_tokio::transport::{ConnectOpts, Transport};
use resock_tokio::{Endpoint, SocketEvent, SocketEvents};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::DuplexStream;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// What the next dial should do.
pub enum DialOutcome {
    Accept,
    Refuse,
}

struct Inner {
    script: Mutex<VecDeque<DialOutcome>>,
    peers: mpsc::UnboundedSender<DuplexStream>,
    last_opts: Mutex<Option<ConnectOpts>>,
    dials: AtomicUsize,
}

/// Scripted in-memory transport: each dial pops the next outcome.
///
/// `Accept` hands the peer half of a fresh duplex pipe to the test through
/// the returned channel; `Refuse` fails the dial like a refused TCP
/// connect. An exhausted script keeps refusing.
#[derive(Clone)]
pub struct ScriptedTransport {
    inner: Arc<Inner>,
}

impl ScriptedTransport {
    pub fn new(
        script: impl IntoIterator<Item = DialOutcome>,
    ) -> (Self, mpsc::UnboundedReceiver<DuplexStream>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                inner: Arc::new(Inner {
                    script: Mutex::new(script.into_iter().collect()),
                    peers: tx,
                    last_opts: Mutex::new(None),
                    dials: AtomicUsize::new(0),
                }),
            },
            rx,
        )
    }

    /// How many dials the socket has attempted so far.
    pub fn dials(&self) -> usize {
        self.inner.dials.load(Ordering::SeqCst)
    }

    /// The options passed to the most recent dial.
    pub fn last_opts(&self) -> Option<ConnectOpts> {
        self.inner.last_opts.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    type Io = DuplexStream;

    async fn connect(&self, _endpoint: &Endpoint, opts: &ConnectOpts) -> io::Result<DuplexStream> {
        self.inner.dials.fetch_add(1, Ordering::SeqCst);
        *self.inner.last_opts.lock().unwrap() = Some(opts.clone());

        let outcome = self
            .inner
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(DialOutcome::Refuse);

        match outcome {
            DialOutcome::Accept => {
                let (local, peer) = tokio::io::duplex(64 * 1024);
                let _ = self.inner.peers.send(peer);
                Ok(local)
            }
            DialOutcome::Refuse => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )),
        }
    }
}

/// Await the next event, failing the test after `wait`.
pub async fn next_event(events: &mut SocketEvents, wait: Duration) -> SocketEvent {
    timeout(wait, events.next())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}
