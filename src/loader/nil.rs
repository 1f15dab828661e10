//! Loader with no backing store.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::loader::error::LoaderError;
use crate::loader::RuntimeLoader;
use crate::snapshot::{NilSnapshot, RandomGenerator, RuntimeSnapshot};

/// Serves a permanent `NilSnapshot`. Used when no runtime path is configured.
#[derive(Debug, Clone, Default)]
pub struct NilLoader {
    snapshot: Arc<NilSnapshot>,
}

impl NilLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_random(random: Arc<dyn RandomGenerator>) -> Self {
        Self {
            snapshot: Arc::new(NilSnapshot::with_random(random)),
        }
    }
}

impl RuntimeLoader for NilLoader {
    fn snapshot(&self) -> Arc<dyn RuntimeSnapshot> {
        self.snapshot.clone()
    }

    /// Nothing is watched, so nothing is ever signalled.
    fn add_update_callback(&self, _callback: mpsc::Sender<()>) -> Result<(), LoaderError> {
        Ok(())
    }
}
