//! Configuration for reconnecting sockets.
//!
//! [`SocketConfig`] extends the core [`RetryConfig`] with endpoint defaults
//! and transport / runtime settings (idle timeout, dial options).

use crate::error::{Result, SockError};
use resock_core::RetryConfig;
use std::fmt;
use std::time::Duration;

/// Host used when none was ever configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

// ── Endpoint & ConnectTarget ────────────────────────────────────────────

/// A fully resolved host/port pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Where to connect: optional named fields instead of positional,
/// type-sniffed arguments.
///
/// Fields left unset fall back to the socket's stored endpoint, and the
/// host defaults to [`DEFAULT_HOST`]. A target that ends up without a port
/// is rejected with [`SockError::BadArgument`].
#[derive(Debug, Clone, Default)]
pub struct ConnectTarget {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ConnectTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Resolve against the currently stored endpoint.
    pub(crate) fn resolve(&self, current_host: &str, current_port: Option<u16>) -> Result<Endpoint> {
        let host = self
            .host
            .clone()
            .unwrap_or_else(|| current_host.to_string());
        let port = self
            .port
            .or(current_port)
            .ok_or_else(|| SockError::bad_argument("no port given and none stored"))?;
        Ok(Endpoint { host, port })
    }
}

impl From<u16> for ConnectTarget {
    fn from(port: u16) -> Self {
        Self::new().port(port)
    }
}

impl From<(&str, u16)> for ConnectTarget {
    fn from((host, port): (&str, u16)) -> Self {
        Self::new().host(host).port(port)
    }
}

impl From<(String, u16)> for ConnectTarget {
    fn from((host, port): (String, u16)) -> Self {
        Self::new().host(host).port(port)
    }
}

impl From<&str> for ConnectTarget {
    fn from(host: &str) -> Self {
        Self::new().host(host)
    }
}

impl From<Endpoint> for ConnectTarget {
    fn from(ep: Endpoint) -> Self {
        Self::new().host(ep.host).port(ep.port)
    }
}

// ── SocketConfig ────────────────────────────────────────────────────────

/// Full socket configuration — retry policy + endpoint defaults +
/// transport / runtime settings.
#[derive(Debug, Clone)]
pub struct SocketConfig {
    // Retry policy (forwarded to the resock-core state machine)
    pub reconnect: bool,
    pub max_retries: u32,
    pub retry_interval: Duration,

    // Endpoint defaults
    pub host: String,
    pub port: Option<u16>,

    // Transport / runtime settings (used only by resock-tokio)
    pub idle_timeout: Option<Duration>,
    pub keep_alive: bool,
    pub nodelay: bool,
    pub read_buffer_size: usize,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            reconnect: false,
            max_retries: 10,
            retry_interval: Duration::from_secs(5),
            host: DEFAULT_HOST.to_string(),
            port: None,
            idle_timeout: None,
            keep_alive: false,
            nodelay: false,
            read_buffer_size: 8192,
        }
    }
}

/// Extracts the 2 retry-only fields that the core state machine reads.
impl From<&SocketConfig> for RetryConfig {
    fn from(c: &SocketConfig) -> Self {
        Self {
            max_attempts: c.max_retries,
            base_interval: c.retry_interval,
        }
    }
}

// ── Builder methods ─────────────────────────────────────────────────────

impl SocketConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Retry tuning --

    pub fn reconnect(mut self, enabled: bool) -> Self {
        self.reconnect = enabled;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    // -- Endpoint defaults --

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    // -- Transport / runtime tuning --

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn keep_alive(mut self, enabled: bool) -> Self {
        self.keep_alive = enabled;
        self
    }

    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.nodelay = enabled;
        self
    }

    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    // -- Validation --

    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(SockError::config("Max retries must be greater than 0"));
        }
        if self.retry_interval.is_zero() {
            return Err(SockError::config("Retry interval must be greater than 0"));
        }
        if self.read_buffer_size == 0 {
            return Err(SockError::config("Read buffer size must be greater than 0"));
        }
        Ok(())
    }

    // -- Convenience connect --

    /// Validate, spawn the socket, and dial the configured endpoint.
    ///
    /// With `reconnect` enabled a recoverable dial failure still returns the
    /// socket: the retry machinery is already working on it and progress
    /// arrives on the event channel.
    pub async fn connect(
        self,
    ) -> Result<(crate::socket::ReconnectingSocket, crate::event::SocketEvents)> {
        let reconnect = self.reconnect;
        let (socket, events) = crate::socket::ReconnectingSocket::new(self)?;
        match socket.connect(ConnectTarget::new()).await {
            Ok(_) => Ok((socket, events)),
            Err(e) if reconnect && !e.is_fatal() => Ok((socket, events)),
            Err(e) => Err(e),
        }
    }
}

// ── Presets ─────────────────────────────────────────────────────────────

impl SocketConfig {
    /// Long-lived connection that rides out transient failures.
    pub fn resilient() -> Self {
        Self::default().reconnect(true).keep_alive(true)
    }

    /// Fast recovery for low-latency links: short base interval, more
    /// attempts, Nagle disabled.
    pub fn aggressive() -> Self {
        Self::default()
            .reconnect(true)
            .retry_interval(Duration::from_millis(500))
            .max_retries(20)
            .keep_alive(true)
            .nodelay(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_explicit_fields_any_order() {
        let a = ConnectTarget::new().port(8080).host("example.com");
        let b = ConnectTarget::new().host("example.com").port(8080);

        let resolved_a = a.resolve(DEFAULT_HOST, None).unwrap();
        let resolved_b = b.resolve(DEFAULT_HOST, None).unwrap();
        assert_eq!(resolved_a, resolved_b);
        assert_eq!(resolved_a.host, "example.com");
        assert_eq!(resolved_a.port, 8080);
    }

    #[test]
    fn test_resolve_falls_back_to_stored_values() {
        let target = ConnectTarget::new();
        let resolved = target.resolve("stored.example", Some(9000)).unwrap();
        assert_eq!(resolved.host, "stored.example");
        assert_eq!(resolved.port, 9000);

        // A bare port keeps the stored host
        let resolved = ConnectTarget::from(8080)
            .resolve("stored.example", Some(9000))
            .unwrap();
        assert_eq!(resolved.host, "stored.example");
        assert_eq!(resolved.port, 8080);
    }

    #[test]
    fn test_resolve_without_any_port_is_rejected() {
        let err = ConnectTarget::from("example.com")
            .resolve(DEFAULT_HOST, None)
            .unwrap_err();
        assert!(err.to_string().starts_with("Bad argument to connect"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_target_conversions() {
        let target: ConnectTarget = ("example.com", 8080).into();
        assert_eq!(target.host.as_deref(), Some("example.com"));
        assert_eq!(target.port, Some(8080));

        let target: ConnectTarget = 8080.into();
        assert!(target.host.is_none());
        assert_eq!(target.port, Some(8080));
    }

    #[test]
    fn test_validate_rejects_zero_settings() {
        assert!(SocketConfig::new().max_retries(0).validate().is_err());
        assert!(SocketConfig::new()
            .retry_interval(Duration::ZERO)
            .validate()
            .is_err());
        assert!(SocketConfig::new().read_buffer_size(0).validate().is_err());
        assert!(SocketConfig::resilient().validate().is_ok());
    }

    #[test]
    fn test_retry_config_extraction() {
        let config = SocketConfig::new()
            .max_retries(7)
            .retry_interval(Duration::from_millis(250));
        let retry = RetryConfig::from(&config);
        assert_eq!(retry.max_attempts, 7);
        assert_eq!(retry.base_interval, Duration::from_millis(250));
    }
}
