//! Loader metrics.
//!
//! # Metrics
//! - `<scope>.load_attempts` (counter): one per refresh cycle
//! - `<scope>.load_failures` (counter): one per file that could not be loaded
//! - `<scope>.num_values` (gauge): entry count of the last published snapshot
//!
//! # Design Decisions
//! - Emitted through the `metrics` facade; the host picks the recorder
//! - Mirrored in atomics so tests and hosts can read them without one

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use metrics::{Counter, Gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Point-in-time copy of a loader's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStatsSnapshot {
    pub load_attempts: u64,
    pub load_failures: u64,
    pub num_values: u64,
}

struct StatsInner {
    load_attempts: AtomicU64,
    load_failures: AtomicU64,
    num_values: AtomicU64,
    attempts_counter: Counter,
    failures_counter: Counter,
    num_values_gauge: Gauge,
}

/// Counters for one loader, cheap to clone.
#[derive(Clone)]
pub struct LoaderStats {
    inner: Arc<StatsInner>,
}

impl LoaderStats {
    /// Register the loader metrics under `scope`.
    pub fn new(scope: &str) -> Self {
        Self {
            inner: Arc::new(StatsInner {
                load_attempts: AtomicU64::new(0),
                load_failures: AtomicU64::new(0),
                num_values: AtomicU64::new(0),
                attempts_counter: metrics::counter!(format!("{}.load_attempts", scope)),
                failures_counter: metrics::counter!(format!("{}.load_failures", scope)),
                num_values_gauge: metrics::gauge!(format!("{}.num_values", scope)),
            }),
        }
    }

    pub fn record_attempt(&self) {
        self.inner.load_attempts.fetch_add(1, Ordering::Relaxed);
        self.inner.attempts_counter.increment(1);
    }

    pub fn record_failure(&self) {
        self.inner.load_failures.fetch_add(1, Ordering::Relaxed);
        self.inner.failures_counter.increment(1);
    }

    pub fn set_num_values(&self, count: usize) {
        self.inner.num_values.store(count as u64, Ordering::Relaxed);
        self.inner.num_values_gauge.set(count as f64);
    }

    pub fn snapshot(&self) -> LoaderStatsSnapshot {
        LoaderStatsSnapshot {
            load_attempts: self.inner.load_attempts.load(Ordering::Relaxed),
            load_failures: self.inner.load_failures.load(Ordering::Relaxed),
            num_values: self.inner.num_values.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for LoaderStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LoaderStats").field(&self.snapshot()).finish()
    }
}
