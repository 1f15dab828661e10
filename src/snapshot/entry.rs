//! A single runtime value.

use std::time::{SystemTime, UNIX_EPOCH};

/// One configuration value loaded from a file.
///
/// Integers are pre-parsed at load time so that hot-path lookups such as
/// `get_integer` and percentage checks never touch the string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Raw file contents, untrimmed.
    pub string_value: String,
    /// Parsed integer; only meaningful when `uint64_valid` is set.
    pub uint64_value: u64,
    /// True iff the trimmed contents parsed as a base-10 `u64`.
    pub uint64_valid: bool,
    /// Modification time of the backing file.
    pub modified: SystemTime,
}

impl Entry {
    /// Build an entry from raw contents, parsing the integer value.
    pub fn new(contents: impl Into<String>, modified: SystemTime) -> Self {
        let string_value = contents.into();
        let parsed = parse_u64(&string_value);
        Self {
            uint64_value: parsed.unwrap_or(0),
            uint64_valid: parsed.is_some(),
            string_value,
            modified,
        }
    }

    /// Build an entry with explicit integer fields, bypassing parsing.
    pub fn with_integer(contents: impl Into<String>, value: u64, valid: bool) -> Self {
        Self {
            string_value: contents.into(),
            uint64_value: value,
            uint64_valid: valid,
            modified: UNIX_EPOCH,
        }
    }

    /// The integer value, if the contents held one.
    pub fn as_u64(&self) -> Option<u64> {
        self.uint64_valid.then_some(self.uint64_value)
    }
}

// `u64::from_str` accepts a leading '+', which the base-10 contract does not.
fn parse_u64(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}
