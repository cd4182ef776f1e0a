//! Actor-based socket driver — owns the transport handle in a dedicated
//! task, communicates via channels.
//!
//! The actor serializes every state transition, so the reconnect/backoff
//! machinery needs no locks: the one suspension point is the backoff
//! timer, and at most one is armed at any time (the slot below plus the
//! core `waiting` flag).

use crate::buffer_pool;
use crate::config::{ConnectTarget, Endpoint, SocketConfig};
use crate::error::{ConnectionError, Result, SockError};
use crate::event::SocketEvent;
use crate::metrics;
use crate::socket::SocketStats;
use crate::transport::{ConnectOpts, Transport};

use bytes::{Bytes, BytesMut};
use resock_core::{RetryState, SocketState};
use std::pin::Pin;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, Sleep};
use tracing::{error, info, trace, warn};

/// Commands sent to the socket actor.
pub(crate) enum SocketCmd {
    Connect {
        target: ConnectTarget,
        reply: oneshot::Sender<Result<Endpoint>>,
    },
    Send {
        data: Bytes,
        reply: oneshot::Sender<Result<()>>,
    },
    SetIdle {
        timeout: Duration,
    },
    SetKeepAlive {
        enabled: bool,
    },
    Reconnect,
    Stats {
        reply: oneshot::Sender<SocketStats>,
    },
    IsConnected {
        reply: oneshot::Sender<bool>,
    },
    Destroy {
        reply: oneshot::Sender<()>,
    },
}

/// Whether the run loop should keep going after a command.
#[derive(PartialEq)]
enum Flow {
    Continue,
    Stop,
}

/// One-shot timer slot; empty means disarmed.
type TimerSlot = Option<Pin<Box<Sleep>>>;

/// Await the armed timer, or park forever while the slot is empty.
async fn armed(slot: &mut TimerSlot) {
    match slot.as_mut() {
        Some(timer) => timer.as_mut().await,
        None => std::future::pending().await,
    }
}

/// Read a chunk from the transport, or park forever while disconnected.
async fn read_chunk<I: AsyncRead + Unpin>(
    io: &mut Option<I>,
    buf: &mut BytesMut,
) -> std::io::Result<usize> {
    match io.as_mut() {
        Some(io) => io.read_buf(buf).await,
        None => std::future::pending().await,
    }
}

/// I/O errors are not `Clone`; rebuild one for a second consumer.
fn dup_io_error(e: &std::io::Error) -> std::io::Error {
    std::io::Error::new(e.kind(), e.to_string())
}

/// State owned by the actor task. The transport handle itself lives as a
/// local in [`run_socket_actor`] so the select arms can borrow it apart
/// from the rest of the state.
pub(crate) struct SocketActor<T: Transport> {
    transport: T,
    host: String,
    port: Option<u16>,
    opts: ConnectOpts,
    auto_reconnect: bool,
    retry: RetryState,
    state: SocketState,
    idle_timeout: Option<Duration>,
    read_buffer_size: usize,
    events: mpsc::Sender<SocketEvent>,

    // Per-socket counters, folded into the global metrics on exit
    bytes_sent: u64,
    bytes_received: u64,
    reconnects: u64,
}

impl<T: Transport> SocketActor<T> {
    pub(crate) fn new(
        transport: T,
        config: &SocketConfig,
        events: mpsc::Sender<SocketEvent>,
    ) -> Self {
        Self {
            transport,
            host: config.host.clone(),
            port: config.port,
            opts: ConnectOpts {
                keep_alive: config.keep_alive,
                nodelay: config.nodelay,
            },
            auto_reconnect: config.reconnect,
            retry: RetryState::new(config.into()),
            state: SocketState::Idle,
            idle_timeout: config.idle_timeout,
            read_buffer_size: config.read_buffer_size,
            events,
            bytes_sent: 0,
            bytes_received: 0,
            reconnects: 0,
        }
    }

    fn emit(&self, event: SocketEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(ev)) => {
                warn!(event = ev.kind(), "event receiver lagging, notification dropped");
            }
            Err(TrySendError::Closed(_)) => trace!("event receiver dropped"),
        }
    }

    fn set_state(&mut self, to: SocketState) {
        if let Err(e) = self.state.transition(to) {
            // The table rejecting a move is an actor bug, not a user error
            error!(error = %e, "state machine violation");
        }
    }

    fn rearm_idle(&self, slot: &mut TimerSlot) {
        *slot = self.idle_timeout.map(|t| Box::pin(sleep(t)));
    }

    fn snapshot(&self, connected: bool) -> SocketStats {
        SocketStats {
            state: self.state,
            connected,
            attempts: self.retry.attempts(),
            reconnects: self.reconnects,
            bytes_sent: self.bytes_sent,
            bytes_received: self.bytes_received,
            endpoint: self.port.map(|port| Endpoint {
                host: self.host.clone(),
                port,
            }),
        }
    }

    /// Gracefully end and drop the current transport; teardown errors are
    /// swallowed. Once the handle is dropped, nothing from it can reach
    /// the event channel again.
    async fn teardown(&mut self, io: &mut Option<T::Io>) {
        if let Some(mut stream) = io.take() {
            let _ = stream.shutdown().await;
        }
    }

    async fn handle_cmd(
        &mut self,
        cmd: SocketCmd,
        io: &mut Option<T::Io>,
        reconnect_timer: &mut TimerSlot,
        idle_timer: &mut TimerSlot,
    ) -> Flow {
        match cmd {
            SocketCmd::Connect { target, reply } => {
                let result = self.connect(target, io, reconnect_timer, idle_timer).await;
                let _ = reply.send(result);
            }
            SocketCmd::Send { data, reply } => {
                let result = self.write(data, io, reconnect_timer, idle_timer).await;
                let _ = reply.send(result);
            }
            SocketCmd::SetIdle { timeout } => {
                self.idle_timeout = Some(timeout);
                if io.is_some() {
                    self.rearm_idle(idle_timer);
                }
            }
            SocketCmd::SetKeepAlive { enabled } => {
                // Applied when the next transport is dialed
                self.opts.keep_alive = enabled;
            }
            SocketCmd::Reconnect => {
                self.schedule_reconnect(reconnect_timer);
            }
            SocketCmd::Stats { reply } => {
                let _ = reply.send(self.snapshot(io.is_some()));
            }
            SocketCmd::IsConnected { reply } => {
                let _ = reply.send(io.is_some() && self.state == SocketState::Connected);
            }
            SocketCmd::Destroy { reply } => {
                self.destroy(io).await;
                let _ = reply.send(());
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    /// Resolve the target against the stored endpoint and dial it. An
    /// explicit connect supersedes any pending reconnect timer.
    async fn connect(
        &mut self,
        target: ConnectTarget,
        io: &mut Option<T::Io>,
        reconnect_timer: &mut TimerSlot,
        idle_timer: &mut TimerSlot,
    ) -> Result<Endpoint> {
        let endpoint = match target.resolve(&self.host, self.port) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                // Surface on the event channel too, for listeners that
                // never await the call itself
                if let SockError::BadArgument { message } = &e {
                    self.emit(SocketEvent::Error(SockError::bad_argument(message.clone())));
                }
                return Err(e);
            }
        };

        *reconnect_timer = None;
        self.retry.cancel();

        self.host = endpoint.host.clone();
        self.port = Some(endpoint.port);
        self.dial(endpoint, io, reconnect_timer, idle_timer).await
    }

    /// Tear down whatever transport exists and establish a fresh one.
    async fn dial(
        &mut self,
        endpoint: Endpoint,
        io: &mut Option<T::Io>,
        reconnect_timer: &mut TimerSlot,
        idle_timer: &mut TimerSlot,
    ) -> Result<Endpoint> {
        self.teardown(io).await;
        *idle_timer = None;
        self.set_state(SocketState::Connecting);
        trace!(endpoint = %endpoint, "dialing");

        match self.transport.connect(&endpoint, &self.opts).await {
            Ok(stream) => {
                *io = Some(stream);
                self.set_state(SocketState::Connected);
                self.retry.reset();
                self.rearm_idle(idle_timer);
                info!(endpoint = %endpoint, "connection established");
                self.emit(SocketEvent::Connected);
                Ok(endpoint)
            }
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "dial failed");
                let caller = dup_io_error(&e);
                self.on_transport_error(SockError::Io(e), io, reconnect_timer, idle_timer)
                    .await;
                Err(SockError::Io(caller))
            }
        }
    }

    async fn write(
        &mut self,
        data: Bytes,
        io: &mut Option<T::Io>,
        reconnect_timer: &mut TimerSlot,
        idle_timer: &mut TimerSlot,
    ) -> Result<()> {
        let Some(stream) = io.as_mut() else {
            return Err(SockError::connection(ConnectionError::NotConnected));
        };

        match stream.write_all(&data).await {
            Ok(()) => {
                trace!(bytes = data.len(), "data written");
                self.bytes_sent += data.len() as u64;
                Ok(())
            }
            Err(e) => {
                let caller = dup_io_error(&e);
                self.on_transport_error(SockError::Io(e), io, reconnect_timer, idle_timer)
                    .await;
                Err(SockError::Io(caller))
            }
        }
    }

    /// The peer closed the stream cleanly.
    async fn on_close(
        &mut self,
        io: &mut Option<T::Io>,
        reconnect_timer: &mut TimerSlot,
        idle_timer: &mut TimerSlot,
    ) {
        info!("connection closed by peer");
        self.teardown(io).await;
        *idle_timer = None;
        self.set_state(SocketState::Closed);
        self.emit(SocketEvent::Closed {
            had_error: false,
            error: None,
        });

        if self.auto_reconnect {
            self.schedule_reconnect(reconnect_timer);
        }
    }

    /// A transport operation failed. With auto-reconnect the failure rides
    /// along in the close notification and feeds the retry path instead of
    /// being surfaced.
    async fn on_transport_error(
        &mut self,
        err: SockError,
        io: &mut Option<T::Io>,
        reconnect_timer: &mut TimerSlot,
        idle_timer: &mut TimerSlot,
    ) {
        self.teardown(io).await;
        *idle_timer = None;
        self.set_state(SocketState::Errored);

        if self.auto_reconnect {
            self.emit(SocketEvent::Closed {
                had_error: true,
                error: Some(err),
            });
            self.schedule_reconnect(reconnect_timer);
        } else {
            self.emit(SocketEvent::Error(err));
            self.emit(SocketEvent::Closed {
                had_error: true,
                error: None,
            });
        }
    }

    fn schedule_reconnect(&mut self, reconnect_timer: &mut TimerSlot) {
        if self.state == SocketState::Failed || self.state.is_destroyed() {
            trace!(state = %self.state, "reconnect suppressed");
            return;
        }
        if self.port.is_none() {
            self.emit(SocketEvent::Error(SockError::bad_argument(
                "no port given and none stored",
            )));
            return;
        }

        match self.retry.schedule() {
            Some(wait) => {
                let attempt = self.retry.attempts();
                self.set_state(SocketState::ReconnectScheduled);
                self.reconnects += 1;
                metrics::global_metrics().reconnect_scheduled();
                warn!(attempt, wait_ms = wait.as_millis() as u64, "reconnect scheduled");
                self.emit(SocketEvent::ReconnectScheduled { attempt, wait });
                *reconnect_timer = Some(Box::pin(sleep(wait)));
            }
            None => trace!("reconnect already pending"),
        }
    }

    /// The backoff timer fired: give up past the retry cap, otherwise
    /// replace the transport and dial the stored endpoint again.
    async fn on_reconnect_fired(
        &mut self,
        io: &mut Option<T::Io>,
        reconnect_timer: &mut TimerSlot,
        idle_timer: &mut TimerSlot,
    ) {
        match self.retry.fire() {
            Err(e) => {
                error!(error = %e, "giving up");
                self.set_state(SocketState::Failed);
                metrics::global_metrics().retry_exhausted();
                self.emit(SocketEvent::Error(e.into()));
            }
            Ok(()) => {
                let Some(port) = self.port else {
                    error!("reconnect fired without a stored endpoint");
                    return;
                };
                let endpoint = Endpoint {
                    host: self.host.clone(),
                    port,
                };
                if let Err(e) = self.dial(endpoint, io, reconnect_timer, idle_timer).await {
                    trace!(error = %e, "reconnect attempt failed");
                }
            }
        }
    }

    async fn destroy(&mut self, io: &mut Option<T::Io>) {
        self.set_state(SocketState::Destroyed);
        self.teardown(io).await;
        info!("socket destroyed");
        self.emit(SocketEvent::Destroyed);
    }
}

/// Run the socket actor loop.
///
/// The transport handle and both timer slots live here as locals so the
/// select arms can borrow them independently. Breaking out of the loop
/// drops any pending timer, which is what cancels a scheduled reconnect
/// on destroy.
pub(crate) async fn run_socket_actor<T: Transport>(
    mut actor: SocketActor<T>,
    mut cmd_rx: mpsc::Receiver<SocketCmd>,
) {
    let mut io: Option<T::Io> = None;
    let mut read_buf = buffer_pool::try_get_buffer(actor.read_buffer_size);
    let mut reconnect_timer: TimerSlot = None;
    let mut idle_timer: TimerSlot = None;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(cmd) => {
                        let flow = actor
                            .handle_cmd(cmd, &mut io, &mut reconnect_timer, &mut idle_timer)
                            .await;
                        if flow == Flow::Stop {
                            break;
                        }
                    }
                    None => {
                        // Every handle dropped: tear down as if destroyed
                        actor.destroy(&mut io).await;
                        break;
                    }
                }
            }

            result = read_chunk(&mut io, &mut read_buf) => {
                match result {
                    Ok(0) => {
                        actor.on_close(&mut io, &mut reconnect_timer, &mut idle_timer).await;
                    }
                    Ok(n) => {
                        trace!(bytes = n, "data received");
                        actor.bytes_received += n as u64;
                        actor.emit(SocketEvent::Data(read_buf.split().freeze()));
                        actor.rearm_idle(&mut idle_timer);
                        read_buf.reserve(actor.read_buffer_size);
                    }
                    Err(e) => {
                        actor
                            .on_transport_error(
                                SockError::Io(e),
                                &mut io,
                                &mut reconnect_timer,
                                &mut idle_timer,
                            )
                            .await;
                    }
                }
            }

            _ = armed(&mut reconnect_timer) => {
                reconnect_timer = None;
                actor
                    .on_reconnect_fired(&mut io, &mut reconnect_timer, &mut idle_timer)
                    .await;
            }

            _ = armed(&mut idle_timer) => {
                actor.emit(SocketEvent::Idle);
                // Idle notifications are periodic: re-arm with the stored duration
                actor.rearm_idle(&mut idle_timer);
            }
        }
    }

    metrics::global_metrics().socket_closed();
    metrics::global_metrics().update_from_stats(&actor.snapshot(false));
    buffer_pool::try_put_buffer(read_buf);
}
