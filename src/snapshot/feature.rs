//! Percentage-based feature evaluation.
//!
//! # Checks
//! - Integer percentages: `random % 100 < min(p, 100)`
//! - Sticky percentages: `crc32(id_le || key) % 100 < p`
//! - Sample rates: `random_f64 * 100 < min(rate, 100)`, sub-integer granularity

use std::fmt;
use crc32fast::Hasher;
use thiserror::Error;

use crate::snapshot::RuntimeSnapshot;
use crate::snapshot::random::RandomGenerator;

/// Integer percentage check against one random draw.
pub fn percentage_enabled(random: u64, percentage: u64) -> bool {
    random % 100 < percentage.min(100)
}

/// Checksum used for sticky bucketing: CRC-32 (IEEE) over the
/// little-endian id followed by the key bytes.
pub fn sticky_checksum(id: u64, key: &str) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&id.to_le_bytes());
    hasher.update(key.as_bytes());
    hasher.finalize()
}

/// Deterministic percentage check for a stable identity.
pub fn sticky_enabled(id: u64, key: &str, percentage: u32) -> bool {
    sticky_checksum(id, key) % 100 < percentage
}

/// Errors reading a sample rate from a snapshot.
#[derive(Debug, Error, PartialEq)]
pub enum SampleRateError {
    #[error("key {0} does not exist")]
    NotFound(String),

    #[error("invalid sample rate {value:?}: {source}")]
    Parse {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("sample rate {0} outside [0, 100]")]
    OutOfRange(f64),
}

/// A floating point percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct SampleRate(pub f64);

impl SampleRate {
    pub const OFF: SampleRate = SampleRate(0.0);
    pub const MAX: SampleRate = SampleRate(100.0);

    /// Scale by another rate: `self * other / 100`.
    pub fn multiplied_by(self, other: SampleRate) -> SampleRate {
        SampleRate(self.0 * other.0 / 100.0)
    }

    /// Read and validate the rate stored under `key`.
    pub fn from_snapshot<S>(snapshot: &S, key: &str) -> Result<SampleRate, SampleRateError>
    where
        S: RuntimeSnapshot + ?Sized,
    {
        let raw = snapshot.get(key);
        if raw.is_empty() {
            return Err(SampleRateError::NotFound(key.to_string()));
        }
        let trimmed = raw.trim();
        let parsed: f64 = trimmed.parse().map_err(|source| SampleRateError::Parse {
            value: trimmed.to_string(),
            source,
        })?;
        if !(0.0..=100.0).contains(&parsed) {
            return Err(SampleRateError::OutOfRange(parsed));
        }
        Ok(SampleRate(parsed))
    }

    /// The stored rate, or `default` when it is missing or invalid.
    pub fn or_default<S>(snapshot: &S, key: &str, default: SampleRate) -> SampleRate
    where
        S: RuntimeSnapshot + ?Sized,
    {
        Self::from_snapshot(snapshot, key).unwrap_or(default)
    }

    /// Whether `key` holds a valid sample rate.
    pub fn is_defined<S>(snapshot: &S, key: &str) -> bool
    where
        S: RuntimeSnapshot + ?Sized,
    {
        Self::from_snapshot(snapshot, key).is_ok()
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// True `rate` percent of the time.
pub fn sample_rate_enabled(random: &dyn RandomGenerator, rate: SampleRate) -> bool {
    random.random_f64() * 100.0 < rate.0.min(100.0)
}
