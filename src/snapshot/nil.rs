//! Snapshot with no backing store.

use std::sync::Arc;

use crate::snapshot::{default_random, Entry, RandomGenerator, RuntimeSnapshot};

/// Always-empty snapshot served when no runtime directory is configured.
///
/// Every lookup returns its default. `feature_enabled` still draws against
/// the default percentage; `feature_enabled_for_id` is always on.
#[derive(Clone)]
pub struct NilSnapshot {
    random: Arc<dyn RandomGenerator>,
}

impl NilSnapshot {
    pub fn new() -> Self {
        Self {
            random: default_random(),
        }
    }

    pub fn with_random(random: Arc<dyn RandomGenerator>) -> Self {
        Self { random }
    }
}

impl Default for NilSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NilSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NilSnapshot")
    }
}

impl RuntimeSnapshot for NilSnapshot {
    fn entry(&self, _key: &str) -> Option<&Entry> {
        None
    }

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn entries(&self) -> Vec<(&str, &Entry)> {
        Vec::new()
    }

    fn len(&self) -> usize {
        0
    }

    fn random_generator(&self) -> &dyn RandomGenerator {
        self.random.as_ref()
    }

    fn feature_enabled_for_id(&self, _key: &str, _id: u64, _default_percentage: u32) -> bool {
        true
    }
}
