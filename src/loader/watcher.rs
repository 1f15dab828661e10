//! Filesystem event source for the loader.

use std::path::{Path, PathBuf};
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::loader::error::LoaderError;
use crate::loader::refresher::FileSystemOp;

/// Raw watcher output, forwarded from notify's thread.
pub type WatchEvent = notify::Result<Event>;

/// Watches one directory and forwards its events to the loader task.
pub struct RuntimeWatcher {
    path: PathBuf,
    event_tx: mpsc::UnboundedSender<WatchEvent>,
}

impl RuntimeWatcher {
    /// Create a new RuntimeWatcher.
    ///
    /// Returns the watcher and a receiver for its events.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<WatchEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        (Self {
            path: path.to_path_buf(),
            event_tx,
        }, event_rx)
    }

    /// Establish the watch. Events flow until the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, LoaderError> {
        let tx = self.event_tx;

        let mut watcher = RecommendedWatcher::new(move |res: WatchEvent| {
            // Receiver gone means the loader task exited.
            let _ = tx.send(res);
        }, Config::default())
            .map_err(LoaderError::CreateWatcher)?;

        watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|source| LoaderError::Watch {
                path: self.path.clone(),
                source,
            })?;

        tracing::info!(path = ?self.path, "Runtime watcher started");
        Ok(watcher)
    }
}

/// Map a notify event onto the `(path, op)` pairs refreshers understand.
///
/// A rename into place is reported as `Create` on the destination, which is
/// how an atomic symlink swap shows up.
pub fn classify(event: &Event) -> Vec<(PathBuf, FileSystemOp)> {
    let uniform = |op: FileSystemOp| -> Vec<(PathBuf, FileSystemOp)> {
        event.paths.iter().map(|p| (p.clone(), op)).collect()
    };

    match &event.kind {
        EventKind::Create(_) => uniform(FileSystemOp::Create),
        EventKind::Remove(_) => uniform(FileSystemOp::Remove),
        EventKind::Modify(ModifyKind::Metadata(_)) => uniform(FileSystemOp::Chmod),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => uniform(FileSystemOp::Rename),
            RenameMode::To => uniform(FileSystemOp::Create),
            RenameMode::Both => event
                .paths
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let op = if i == 0 { FileSystemOp::Rename } else { FileSystemOp::Create };
                    (p.clone(), op)
                })
                .collect(),
            // Backends that cannot tell the halves apart: whichever side
            // still exists is the destination.
            RenameMode::Any | RenameMode::Other => event
                .paths
                .iter()
                .map(|p| {
                    let op = if p.symlink_metadata().is_ok() {
                        FileSystemOp::Create
                    } else {
                        FileSystemOp::Rename
                    };
                    (p.clone(), op)
                })
                .collect(),
        },
        EventKind::Modify(_) => uniform(FileSystemOp::Write),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}
