//! Random number source for percentage-based feature checks.

use std::sync::{Arc, Mutex, OnceLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A uniformly distributed 64-bit random source.
///
/// Implementations must be safe to call from any number of threads at once.
pub trait RandomGenerator: Send + Sync {
    /// Produce a new random number.
    fn random(&self) -> u64;

    /// A float in `[0, 1)` built from the top 53 bits of `random`.
    fn random_f64(&self) -> f64 {
        (self.random() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Entropy-seeded generator with access serialized by a mutex.
#[derive(Debug)]
pub struct SharedRandom {
    rng: Mutex<StdRng>,
}

impl SharedRandom {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seeded generator for reproducible sequences.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SharedRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomGenerator for SharedRandom {
    fn random(&self) -> u64 {
        // A panic while holding the lock cannot leave StdRng in a torn state.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen()
    }
}

/// The process-wide generator used when none is injected.
pub fn default_random() -> Arc<dyn RandomGenerator> {
    static DEFAULT: OnceLock<Arc<dyn RandomGenerator>> = OnceLock::new();
    DEFAULT
        .get_or_init(|| Arc::new(SharedRandom::new()))
        .clone()
}
