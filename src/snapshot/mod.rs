//! Point-in-time runtime values.
//!
//! # Data Flow
//! ```text
//! loader walk (one file → one Entry)
//!     → SnapshotBuilder (owned by the refresh cycle)
//!     → Snapshot (frozen, shared via Arc)
//!     → readers: get / get_integer / feature_enabled*
//! ```
//!
//! # Design Decisions
//! - Snapshots never change after `build()`; a refresh publishes a new one
//! - Readers holding an old snapshot keep a consistent view
//! - Random draws go through an injectable `RandomGenerator`

pub mod entry;
pub mod feature;
pub mod mock;
pub mod nil;
pub mod random;
pub mod store;

use std::time::{SystemTime, UNIX_EPOCH};

pub use entry::Entry;
pub use feature::{SampleRate, SampleRateError};
pub use mock::MockSnapshot;
pub use nil::NilSnapshot;
pub use random::{default_random, RandomGenerator, SharedRandom};
pub use store::{Snapshot, SnapshotBuilder};

/// Read access to a set of runtime values.
pub trait RuntimeSnapshot: Send + Sync {
    /// Look up the raw entry for `key`.
    fn entry(&self, key: &str) -> Option<&Entry>;

    /// All keys. Order is unspecified.
    fn keys(&self) -> Vec<String>;

    /// All key/entry pairs. Order is unspecified.
    fn entries(&self) -> Vec<(&str, &Entry)>;

    /// Number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source for `feature_enabled` and `feature_enabled_f` draws.
    fn random_generator(&self) -> &dyn RandomGenerator;

    /// The raw value for `key`, or `""` if absent.
    fn get(&self, key: &str) -> &str {
        self.entry(key).map(|e| e.string_value.as_str()).unwrap_or("")
    }

    /// The integer value for `key`, or `default` if absent or not an integer.
    fn get_integer(&self, key: &str, default: u64) -> u64 {
        self.entry(key).and_then(Entry::as_u64).unwrap_or(default)
    }

    /// Modification time of `key`, or the UNIX epoch if absent.
    fn get_modified(&self, key: &str) -> SystemTime {
        self.entry(key).map(|e| e.modified).unwrap_or(UNIX_EPOCH)
    }

    /// Test a feature with a fresh random draw in `0..100` against the
    /// stored percentage (or `default`), capped at 100.
    ///
    /// Repeated calls against the same snapshot may disagree. Callers that
    /// need a stable answer per identity should use `feature_enabled_for_id`.
    fn feature_enabled(&self, key: &str, default: u64) -> bool {
        let percentage = self.get_integer(key, default);
        feature::percentage_enabled(self.random_generator().random(), percentage)
    }

    /// Sticky feature check: the same `(key, id, percentage)` always yields
    /// the same answer.
    fn feature_enabled_for_id(&self, key: &str, id: u64, default_percentage: u32) -> bool {
        let percentage = self
            .entry(key)
            .and_then(Entry::as_u64)
            .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
            .unwrap_or(default_percentage);
        feature::sticky_enabled(id, key, percentage)
    }

    /// Like `feature_enabled` with a floating point percentage. Stored values
    /// that are unparseable or outside `[0, 100]` fall back to `default`.
    fn feature_enabled_f(&self, key: &str, default: SampleRate) -> bool {
        let rate = SampleRate::or_default(self, key, default);
        feature::sample_rate_enabled(self.random_generator(), rate)
    }
}
