//! Runtime loading subsystem.
//!
//! # Data Flow
//! ```text
//! new(root, sub, refresher, options)
//!     → empty root/sub? → NilLoader
//!     → refresher.watch_directory() → watcher.rs (notify, non-recursive)
//!     → walk.rs builds the first Snapshot synchronously
//!
//! On filesystem event (background task, sequential):
//!     watcher.rs classify → refresher.should_refresh()
//!     → walk.rs builds a new Snapshot
//!     → atomic swap of Arc<Snapshot>
//!     → fanout.rs signals subscribers (non-blocking, coalescing)
//! ```
//!
//! # Design Decisions
//! - Snapshots are replaced wholesale, never mutated in place
//! - Readers never wait on the refresh task
//! - A per-file error skips that file only; only watch setup is fatal

pub mod error;
pub mod fanout;
pub mod file;
pub mod mock;
pub mod nil;
pub mod refresher;
pub mod walk;
pub mod watcher;

use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::snapshot::{default_random, RandomGenerator, RuntimeSnapshot};

pub use error::LoaderError;
pub use file::Loader;
pub use mock::MockLoader;
pub use nil::NilLoader;
pub use refresher::{DirectoryRefresher, FileSystemOp, RefreshPolicy, Refresher, SymlinkRefresher};

/// Source of runtime snapshots.
pub trait RuntimeLoader: Send + Sync {
    /// The current snapshot. Safe to hold forever, but goes stale, so fetch
    /// a fresh one for each unit of work rather than caching it.
    fn snapshot(&self) -> Arc<dyn RuntimeSnapshot>;

    /// Register a channel that receives `()` after a new snapshot is
    /// published. Signals coalesce; a slow reader sees at least one more
    /// signal, not one per refresh.
    fn add_update_callback(&self, callback: mpsc::Sender<()>) -> Result<(), LoaderError>;
}

/// Construction options for a loader.
#[derive(Clone)]
pub struct LoaderOptions {
    /// Skip files and directories whose names start with `.`.
    pub ignore_dotfiles: bool,
    /// Prefix for the loader's metric names.
    pub stats_scope: String,
    /// Random source handed to every snapshot.
    pub random: Arc<dyn RandomGenerator>,
}

impl LoaderOptions {
    /// Include hidden files and directories (the default).
    pub fn allow_dotfiles() -> Self {
        Self::default()
    }

    /// Exclude hidden files and directories.
    pub fn ignore_dotfiles() -> Self {
        Self {
            ignore_dotfiles: true,
            ..Self::default()
        }
    }

    pub fn with_stats_scope(mut self, scope: impl Into<String>) -> Self {
        self.stats_scope = scope.into();
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomGenerator>) -> Self {
        self.random = random;
        self
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            ignore_dotfiles: false,
            stats_scope: "runtime".to_string(),
            random: default_random(),
        }
    }
}

impl std::fmt::Debug for LoaderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderOptions")
            .field("ignore_dotfiles", &self.ignore_dotfiles)
            .field("stats_scope", &self.stats_scope)
            .finish_non_exhaustive()
    }
}

/// Create a loader for `root_path/sub_path`.
///
/// An empty root or subdirectory yields a `NilLoader` rather than an error.
/// Fails only if the filesystem watch cannot be established.
pub fn new<R: Refresher>(
    root_path: impl AsRef<Path>,
    sub_path: impl AsRef<Path>,
    refresher: R,
    options: LoaderOptions,
) -> Result<Arc<dyn RuntimeLoader>, LoaderError> {
    let root_path = root_path.as_ref();
    let sub_path = sub_path.as_ref();

    if root_path.as_os_str().is_empty() || sub_path.as_os_str().is_empty() {
        tracing::warn!("no runtime configuration, using nil loader");
        return Ok(Arc::new(NilLoader::with_random(options.random)));
    }

    Ok(Arc::new(Loader::start(root_path, sub_path, refresher, options)?))
}
