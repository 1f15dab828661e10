//! In-memory snapshot for tests of runtime consumers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use crate::snapshot::{default_random, Entry, RandomGenerator, RuntimeSnapshot};

/// A hand-populated snapshot.
///
/// `feature_enabled` is overridden to be deterministic: a key is enabled
/// iff it is present and holds an integer.
#[derive(Clone)]
pub struct MockSnapshot {
    entries: HashMap<String, Entry>,
    random: Arc<dyn RandomGenerator>,
}

impl MockSnapshot {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            random: default_random(),
        }
    }

    /// Store `value` under `key`, parsing it like a loaded file.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), Entry::new(value, UNIX_EPOCH));
        self
    }

    /// Store an integer under `key`.
    pub fn set_u64(mut self, key: impl Into<String>, value: u64) -> Self {
        self.entries
            .insert(key.into(), Entry::with_integer(value.to_string(), value, true));
        self
    }

    /// Mark `key` as enabled for `feature_enabled`.
    pub fn set_enabled(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.entries.insert(key.clone(), Entry::with_integer(key, 0, true));
        self
    }

    /// Mark `key` as disabled for `feature_enabled`.
    pub fn set_disabled(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.entries.insert(key.clone(), Entry::with_integer(key, 0, false));
        self
    }

    /// Store a fully specified entry.
    pub fn set_entry(mut self, key: impl Into<String>, entry: Entry) -> Self {
        self.entries.insert(key.into(), entry);
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomGenerator>) -> Self {
        self.random = random;
        self
    }
}

impl Default for MockSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSnapshot")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl RuntimeSnapshot for MockSnapshot {
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

    fn feature_enabled(&self, key: &str, _default: u64) -> bool {
        self.entries.get(key).is_some_and(|e| e.uint64_valid)
    }
}
