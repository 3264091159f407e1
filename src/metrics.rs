//! Prometheus metrics for the adapter.
//!
//! Instruments are atomic, so one `AdapterMetrics` is shared by all request
//! handlers behind an `Arc`.

use std::fmt;
use std::time::Duration;

use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

const PREFIX: &str = "remote_adapter";

/// Container for all adapter metrics and the registry that exposes them.
pub struct AdapterMetrics {
    registry: Registry,

    /// Histogram of write request latency in seconds.
    pub write_latency_seconds: Histogram,

    /// Histogram of samples per written series.
    pub write_timeseries_samples: Histogram,

    /// Histogram of per-sample storage write latency in seconds.
    pub write_storage_latency_seconds: Histogram,

    /// Counter of failed storage writes.
    pub write_storage_failed: Counter,

    /// Histogram of read request latency in seconds.
    pub read_latency_seconds: Histogram,

    /// Histogram of storage query latency in seconds.
    pub read_storage_latency_seconds: Histogram,

    /// Counter of failed storage queries.
    pub read_storage_failed: Counter,

    /// Histogram of samples per returned series.
    pub read_timeseries_samples: Histogram,
}

impl Default for AdapterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn latency_histogram() -> Histogram {
    // 1ms to ~16s
    Histogram::new(exponential_buckets(0.001, 2.0, 15))
}

fn count_histogram() -> Histogram {
    // 1 to ~32k samples
    Histogram::new(exponential_buckets(1.0, 2.0, 16))
}

impl AdapterMetrics {
    /// Create a new registry with all metrics registered.
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix(PREFIX);

        let write_latency_seconds = latency_histogram();
        registry.register(
            "write_latency_seconds",
            "How long it took us to respond to write requests",
            write_latency_seconds.clone(),
        );

        let write_timeseries_samples = count_histogram();
        registry.register(
            "write_timeseries_samples",
            "How many samples each written timeseries has",
            write_timeseries_samples.clone(),
        );

        let write_storage_latency_seconds = latency_histogram();
        registry.register(
            "write_storage_latency_seconds",
            "Latency of single sample writes to the storage backend",
            write_storage_latency_seconds.clone(),
        );

        // Exposed with a `_total` suffix
        let write_storage_failed = Counter::default();
        registry.register(
            "write_storage_failed",
            "How many sample writes to the storage backend failed",
            write_storage_failed.clone(),
        );

        let read_latency_seconds = latency_histogram();
        registry.register(
            "read_latency_seconds",
            "How long it took us to respond to read requests",
            read_latency_seconds.clone(),
        );

        let read_storage_latency_seconds = latency_histogram();
        registry.register(
            "read_storage_latency_seconds",
            "Latency of queries against the storage backend",
            read_storage_latency_seconds.clone(),
        );

        let read_storage_failed = Counter::default();
        registry.register(
            "read_storage_failed",
            "How many queries against the storage backend failed",
            read_storage_failed.clone(),
        );

        let read_timeseries_samples = count_histogram();
        registry.register(
            "read_timeseries_samples",
            "How many samples each returned timeseries has",
            read_timeseries_samples.clone(),
        );

        Self {
            registry,
            write_latency_seconds,
            write_timeseries_samples,
            write_storage_latency_seconds,
            write_storage_failed,
            read_latency_seconds,
            read_storage_latency_seconds,
            read_storage_failed,
            read_timeseries_samples,
        }
    }

    /// Encode all metrics to Prometheus text format.
    pub fn encode(&self) -> Result<String, fmt::Error> {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

/// Record an elapsed duration into a seconds histogram.
pub(crate) fn observe_duration(histogram: &Histogram, elapsed: Duration) {
    histogram.observe(elapsed.as_secs_f64());
}
