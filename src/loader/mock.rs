//! In-memory loader for tests of runtime consumers.

use std::sync::Arc;
use arc_swap::ArcSwap;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::lifecycle::Shutdown;
use crate::loader::error::LoaderError;
use crate::loader::fanout::UpdateFanout;
use crate::loader::RuntimeLoader;
use crate::observability::metrics::{LoaderStats, LoaderStatsSnapshot};
use crate::snapshot::{MockSnapshot, RuntimeSnapshot};

/// A loader whose snapshots are published by hand.
///
/// `publish` follows the same swap-then-signal path as the file loader, so
/// subscribers observe identical notification behavior.
pub struct MockLoader {
    current: ArcSwap<MockSnapshot>,
    fanout: UpdateFanout,
    stats: LoaderStats,
}

impl MockLoader {
    /// Serve `snapshot`. Callbacks can only be registered inside a tokio runtime.
    pub fn new(snapshot: MockSnapshot) -> Self {
        let stats = LoaderStats::new("runtime");
        stats.record_attempt();
        stats.set_num_values(snapshot.len());
        Self {
            current: ArcSwap::from_pointee(snapshot),
            fanout: UpdateFanout::new(Handle::try_current().ok(), Shutdown::new()),
            stats,
        }
    }

    /// Serve string values, parsed like loaded files.
    pub fn from_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let snapshot = values
            .into_iter()
            .fold(MockSnapshot::new(), |s, (k, v)| s.set(k, v));
        Self::new(snapshot)
    }

    /// Replace the served snapshot and signal subscribers.
    pub fn publish(&self, snapshot: MockSnapshot) {
        self.stats.record_attempt();
        self.stats.set_num_values(snapshot.len());
        self.current.store(Arc::new(snapshot));
        self.fanout.signal();
    }

    pub fn stats(&self) -> LoaderStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for MockLoader {
    fn default() -> Self {
        Self::new(MockSnapshot::new())
    }
}

impl RuntimeLoader for MockLoader {
    fn snapshot(&self) -> Arc<dyn RuntimeSnapshot> {
        self.current.load_full()
    }

    fn add_update_callback(&self, callback: mpsc::Sender<()>) -> Result<(), LoaderError> {
        self.fanout.subscribe(callback)
    }
}
