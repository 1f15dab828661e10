//! Live, in-memory view of a configuration tree stored as files.
//!
//! Each regular file under `root/sub` becomes one key (its relative path
//! with separators replaced by `.`). A background task reloads the tree
//! when the filesystem says it changed and publishes a new immutable
//! snapshot; readers always see a complete snapshot.

pub mod config;
pub mod lifecycle;
pub mod loader;
pub mod observability;
pub mod snapshot;

pub use loader::{Loader, LoaderError, LoaderOptions, RuntimeLoader};
pub use snapshot::{RuntimeSnapshot, SampleRate, Snapshot};
