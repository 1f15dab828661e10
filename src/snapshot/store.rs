//! Immutable file-backed snapshot.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::snapshot::{default_random, Entry, RandomGenerator, RuntimeSnapshot};

/// A frozen mapping of keys to entries.
#[derive(Clone)]
pub struct Snapshot {
    entries: HashMap<String, Entry>,
    random: Arc<dyn RandomGenerator>,
}

impl Snapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// A snapshot with no entries.
    pub fn empty() -> Self {
        SnapshotBuilder::new().build()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl RuntimeSnapshot for Snapshot {
    fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn entries(&self) -> Vec<(&str, &Entry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e)).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn random_generator(&self) -> &dyn RandomGenerator {
        self.random.as_ref()
    }
}

impl FromIterator<(String, Entry)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, Entry)>>(iter: I) -> Self {
        let mut builder = SnapshotBuilder::new();
        for (key, entry) in iter {
            builder.insert(key, entry);
        }
        builder.build()
    }
}

/// Mutable staging area for a snapshot under construction.
pub struct SnapshotBuilder {
    entries: HashMap<String, Entry>,
    random: Arc<dyn RandomGenerator>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            random: default_random(),
        }
    }

    /// Use `random` for the built snapshot's percentage draws.
    pub fn with_random(mut self, random: Arc<dyn RandomGenerator>) -> Self {
        self.random = random;
        self
    }

    /// Insert an entry, returning any previous entry for `key`.
    pub fn insert(&mut self, key: impl Into<String>, entry: Entry) -> Option<Entry> {
        self.entries.insert(key.into(), entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze into a read-only snapshot.
    pub fn build(self) -> Snapshot {
        Snapshot {
            entries: self.entries,
            random: self.random,
        }
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}
