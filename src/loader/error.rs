//! Loader error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur creating or using a loader.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The OS watch facility could not be initialized. On Linux this is
    /// usually `fs.inotify.max_user_instances` being exhausted (EMFILE).
    #[error("unable to create runtime watcher: {0}")]
    CreateWatcher(#[source] notify::Error),

    /// The watch on the target directory could not be established.
    #[error("unable to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// Background tasks need a tokio runtime to spawn on.
    #[error("runtime loader must be created within a tokio runtime")]
    NoRuntime,

    /// The update callback's receiver was already dropped.
    #[error("update callback channel is closed")]
    ClosedCallback,
}
