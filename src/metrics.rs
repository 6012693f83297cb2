// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the search client.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `sphinx_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `transport`: api, sphinxql
//! - `operation`: query, batch, excerpts, keywords, update
//! - `status`: success, error

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a finished search request
pub fn record_query(transport: &str, operation: &str, status: &str) {
    counter!(
        "sphinx_queries_total",
        "transport" => transport.to_string(),
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record request latency
pub fn record_latency(transport: &str, operation: &str, duration: Duration) {
    histogram!(
        "sphinx_query_seconds",
        "transport" => transport.to_string(),
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record number of queries sent in one round trip
pub fn record_batch_size(transport: &str, count: usize) {
    histogram!(
        "sphinx_batch_size",
        "transport" => transport.to_string()
    )
    .record(count as f64);
}

/// Record matches returned across a batch
pub fn record_matches(transport: &str, count: usize) {
    histogram!(
        "sphinx_matches_returned",
        "transport" => transport.to_string()
    )
    .record(count as f64);
}

/// Record connection lifecycle event (opened, closed, failed, dropped)
pub fn record_connection_event(transport: &str, event: &str) {
    counter!(
        "sphinx_connection_events_total",
        "transport" => transport.to_string(),
        "event" => event.to_string()
    )
    .increment(1);
}

/// A timing guard that records latency on drop
pub struct LatencyTimer {
    transport: &'static str,
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    pub fn new(transport: &'static str, operation: &'static str) -> Self {
        Self {
            transport,
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.transport, self.operation, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Without an installed recorder these only verify nothing panics.

    #[test]
    fn test_record_query() {
        record_query("api", "batch", "success");
        record_query("sphinxql", "query", "error");
    }

    #[test]
    fn test_histograms() {
        record_latency("api", "batch", Duration::from_millis(3));
        record_batch_size("sphinxql", 2);
        record_matches("sphinxql", 40);
    }

    #[test]
    fn test_latency_timer() {
        let _timer = LatencyTimer::new("api", "query");
        std::thread::sleep(Duration::from_millis(1));
    }

    #[test]
    fn test_query_counter_labels() {
        use metrics_util::debugging::{DebugValue, DebuggingRecorder};

        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        metrics::with_local_recorder(&recorder, || {
            record_query("api", "batch", "success");
            record_query("api", "batch", "success");
        });

        let entries = snapshotter.snapshot().into_vec();
        let (key, _, _, value) = entries
            .iter()
            .find(|(k, _, _, _)| k.key().name() == "sphinx_queries_total")
            .expect("counter recorded");
        let labels: Vec<_> = key.key().labels().map(|l| (l.key(), l.value())).collect();
        assert!(labels.contains(&("transport", "api")));
        assert!(labels.contains(&("status", "success")));
        assert_eq!(value, &DebugValue::Counter(2));
    }
}
