//! Process-wide operational counters.
//!
//! One [`ServerMetrics`] instance lives for the whole process, shared via
//! `Arc` between the accept loop, every connection task, and whatever
//! endpoint reports the numbers. All updates are single atomic increments,
//! so a concurrent [`snapshot`](ServerMetrics::snapshot) never observes a
//! half-updated counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

/// Counter registry for the connection layer.
///
/// `connection_count` is a gauge of currently open connections; everything
/// else is a monotonic total since process start.
#[derive(Debug)]
pub struct ServerMetrics {
    started_at: Instant,
    connection_count: AtomicU64,
    new_connections: AtomicU64,
    requests: AtomicU64,
    responses: AtomicU64,
    bytes_received: AtomicU64,
    bytes_send: AtomicU64,
    disconnects: AtomicU64,
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self {
            started_at: Instant::now(),
            connection_count: AtomicU64::new(0),
            new_connections: AtomicU64::new(0),
            requests: AtomicU64::new(0),
            responses: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            bytes_send: AtomicU64::new(0),
            disconnects: AtomicU64::new(0),
        }
    }
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an accepted connection.
    pub fn connection_opened(&self) {
        self.connection_count.fetch_add(1, Ordering::Relaxed);
        self.new_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a closed connection, whatever the reason.
    pub fn connection_closed(&self) {
        self.connection_count.fetch_sub(1, Ordering::Relaxed);
        self.disconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_responses(&self) {
        self.responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes_received(&self, n: u64) {
        self.bytes_received.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_bytes_send(&self, n: u64) {
        self.bytes_send.fetch_add(n, Ordering::Relaxed);
    }

    /// A consistent-enough point-in-time read of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connection_count: self.connection_count.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            bytes_send: self.bytes_send.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
            new_connections: self.new_connections.load(Ordering::Relaxed),
            requests: self.requests.load(Ordering::Relaxed),
            responses: self.responses.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed().as_secs(),
        }
    }
}

/// The plain-number shape consumed by the dashboard's metrics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub connection_count: u64,
    pub bytes_received: u64,
    pub bytes_send: u64,
    pub disconnects: u64,
    pub new_connections: u64,
    pub requests: u64,
    pub responses: u64,
    /// Seconds since the registry was created
    pub uptime: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = ServerMetrics::new();
        metrics.connection_opened();
        metrics.connection_opened();
        metrics.connection_closed();
        metrics.incr_requests();
        metrics.incr_responses();
        metrics.add_bytes_received(128);
        metrics.add_bytes_send(256);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.connection_count, 1);
        assert_eq!(snapshot.new_connections, 2);
        assert_eq!(snapshot.disconnects, 1);
        assert_eq!(snapshot.requests, 1);
        assert_eq!(snapshot.responses, 1);
        assert_eq!(snapshot.bytes_received, 128);
        assert_eq!(snapshot.bytes_send, 256);
    }

    #[test]
    fn snapshot_serializes_with_dashboard_field_names() {
        let metrics = ServerMetrics::new();
        metrics.connection_opened();

        let value = serde_json::to_value(metrics.snapshot()).unwrap();
        for key in
            ["connection_count", "bytes_received", "bytes_send", "disconnects", "new_connections", "requests", "responses", "uptime"]
        {
            assert!(value.get(key).is_some(), "missing field {key}");
        }
        assert_eq!(value["connection_count"], 1);
    }
}
