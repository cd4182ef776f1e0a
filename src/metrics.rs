//! Process-wide metrics and monitoring for reconnecting sockets

use crate::socket::SocketStats;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Global metrics collector
#[derive(Debug)]
pub struct GlobalMetrics {
    /// Total sockets created
    pub sockets_created: AtomicU64,
    /// Sockets whose actor is still running
    pub sockets_active: AtomicUsize,
    /// Total bytes written across all sockets
    pub total_bytes_sent: AtomicU64,
    /// Total bytes read across all sockets
    pub total_bytes_received: AtomicU64,
    /// Reconnect attempts scheduled
    pub total_reconnects_scheduled: AtomicU64,
    /// Sockets that ran out of retries
    pub total_retries_exhausted: AtomicU64,
}

impl Default for GlobalMetrics {
    fn default() -> Self {
        Self {
            sockets_created: AtomicU64::new(0),
            sockets_active: AtomicUsize::new(0),
            total_bytes_sent: AtomicU64::new(0),
            total_bytes_received: AtomicU64::new(0),
            total_reconnects_scheduled: AtomicU64::new(0),
            total_retries_exhausted: AtomicU64::new(0),
        }
    }
}

impl GlobalMetrics {
    /// Record a new socket
    pub fn socket_created(&self) {
        self.sockets_created.fetch_add(1, Ordering::Relaxed);
        self.sockets_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a socket actor stopping
    pub fn socket_closed(&self) {
        self.sockets_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record one scheduled reconnect attempt
    pub fn reconnect_scheduled(&self) {
        self.total_reconnects_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a socket giving up after its retry cap
    pub fn retry_exhausted(&self) {
        self.total_retries_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// Fold a socket's final counters in (accumulates, not overwrites)
    pub fn update_from_stats(&self, stats: &SocketStats) {
        self.total_bytes_sent
            .fetch_add(stats.bytes_sent, Ordering::Relaxed);
        self.total_bytes_received
            .fetch_add(stats.bytes_received, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sockets_created: self.sockets_created.load(Ordering::Relaxed),
            sockets_active: self.sockets_active.load(Ordering::Relaxed),
            total_bytes_sent: self.total_bytes_sent.load(Ordering::Relaxed),
            total_bytes_received: self.total_bytes_received.load(Ordering::Relaxed),
            total_reconnects_scheduled: self.total_reconnects_scheduled.load(Ordering::Relaxed),
            total_retries_exhausted: self.total_retries_exhausted.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub sockets_created: u64,
    pub sockets_active: usize,
    pub total_bytes_sent: u64,
    pub total_bytes_received: u64,
    pub total_reconnects_scheduled: u64,
    pub total_retries_exhausted: u64,
}

impl MetricsSnapshot {
    /// Average reconnects scheduled per socket created
    pub fn reconnects_per_socket(&self) -> f64 {
        if self.sockets_created == 0 {
            0.0
        } else {
            self.total_reconnects_scheduled as f64 / self.sockets_created as f64
        }
    }
}

/// Global metrics instance
pub static GLOBAL_METRICS: std::sync::LazyLock<GlobalMetrics> =
    std::sync::LazyLock::new(GlobalMetrics::default);

/// Get global metrics
pub fn global_metrics() -> &'static GlobalMetrics {
    &GLOBAL_METRICS
}

/// Format metrics for human-readable display
pub fn format_metrics(snapshot: &MetricsSnapshot) -> String {
    format!(
        "Socket Metrics:\n\
         Sockets: {} created, {} active\n\
         Traffic: {} bytes sent, {} bytes received\n\
         Reconnects: {} scheduled ({:.2} per socket), {} exhausted",
        snapshot.sockets_created,
        snapshot.sockets_active,
        snapshot.total_bytes_sent,
        snapshot.total_bytes_received,
        snapshot.total_reconnects_scheduled,
        snapshot.reconnects_per_socket(),
        snapshot.total_retries_exhausted,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_metrics() {
        let metrics = GlobalMetrics::default();

        metrics.socket_created();
        assert_eq!(metrics.sockets_active.load(Ordering::Relaxed), 1);

        metrics.socket_closed();
        assert_eq!(metrics.sockets_active.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_update_from_stats_accumulates() {
        let metrics = GlobalMetrics::default();

        let stats = SocketStats {
            bytes_sent: 10,
            bytes_received: 20,
            ..Default::default()
        };
        metrics.update_from_stats(&stats);
        metrics.update_from_stats(&stats);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_bytes_sent, 20);
        assert_eq!(snapshot.total_bytes_received, 40);
    }
}
