//! Refresh policies: what to watch and which events trigger a reload.

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use serde::{Deserialize, Serialize};

/// Filesystem operations reported by the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSystemOp {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
}

impl fmt::Display for FileSystemOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileSystemOp::Create => "CREATE",
            FileSystemOp::Write => "WRITE",
            FileSystemOp::Remove => "REMOVE",
            FileSystemOp::Rename => "RENAME",
            FileSystemOp::Chmod => "CHMOD",
        };
        f.write_str(name)
    }
}

/// Decides which directory the loader watches and when it reloads.
pub trait Refresher: Send + 'static {
    /// Directory to subscribe to. Called once, before the watch starts.
    fn watch_directory(&mut self, root_path: &Path, sub_path: &Path) -> PathBuf;

    /// Whether `op` on `path` should trigger a reload.
    fn should_refresh(&self, path: &Path, op: FileSystemOp) -> bool;
}

/// Reloads when the runtime root, a symlink, is atomically swapped.
///
/// Replacing a symlink shows up as an event on its parent directory, so the
/// parent is watched and only Write/Create on the link path itself count.
/// Assumes the rename-into-place swap convention; other replace strategies
/// such as hard link swaps are not detected.
#[derive(Debug, Clone)]
pub struct SymlinkRefresher {
    runtime_path: PathBuf,
}

impl SymlinkRefresher {
    pub fn new(runtime_path: impl Into<PathBuf>) -> Self {
        Self {
            runtime_path: without_cur_dir(&runtime_path.into()),
        }
    }

    pub fn runtime_path(&self) -> &Path {
        &self.runtime_path
    }
}

impl Refresher for SymlinkRefresher {
    fn watch_directory(&mut self, root_path: &Path, _sub_path: &Path) -> PathBuf {
        match root_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn should_refresh(&self, path: &Path, op: FileSystemOp) -> bool {
        matches!(op, FileSystemOp::Write | FileSystemOp::Create)
            && without_cur_dir(path) == self.runtime_path
    }
}

/// `./current` and `current` name the same link; the watcher reports the
/// former when the watched directory is `.`.
fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Reloads on changes directly inside `root/sub`.
#[derive(Debug, Clone, Default)]
pub struct DirectoryRefresher {
    current_dir: PathBuf,
    watch_ops: Option<HashSet<FileSystemOp>>,
}

impl DirectoryRefresher {
    /// Ops that trigger a reload unless overridden.
    pub const DEFAULT_OPS: [FileSystemOp; 3] =
        [FileSystemOp::Write, FileSystemOp::Create, FileSystemOp::Chmod];

    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the trigger set. Not additive.
    pub fn watch_file_system_ops<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = FileSystemOp>,
    {
        self.watch_ops = Some(ops.into_iter().collect());
    }

    /// Builder form of `watch_file_system_ops`.
    pub fn with_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = FileSystemOp>,
    {
        self.watch_file_system_ops(ops);
        self
    }

    fn triggers(&self, op: FileSystemOp) -> bool {
        match &self.watch_ops {
            Some(ops) => ops.contains(&op),
            None => Self::DEFAULT_OPS.contains(&op),
        }
    }
}

impl Refresher for DirectoryRefresher {
    fn watch_directory(&mut self, root_path: &Path, sub_path: &Path) -> PathBuf {
        self.current_dir = root_path.join(sub_path);
        self.current_dir.clone()
    }

    fn should_refresh(&self, path: &Path, op: FileSystemOp) -> bool {
        path.parent() == Some(self.current_dir.as_path()) && self.triggers(op)
    }
}

/// The built-in policies, selectable from configuration.
#[derive(Debug, Clone)]
pub enum RefreshPolicy {
    Symlink(SymlinkRefresher),
    Directory(DirectoryRefresher),
}

impl Refresher for RefreshPolicy {
    fn watch_directory(&mut self, root_path: &Path, sub_path: &Path) -> PathBuf {
        match self {
            RefreshPolicy::Symlink(r) => r.watch_directory(root_path, sub_path),
            RefreshPolicy::Directory(r) => r.watch_directory(root_path, sub_path),
        }
    }

    fn should_refresh(&self, path: &Path, op: FileSystemOp) -> bool {
        match self {
            RefreshPolicy::Symlink(r) => r.should_refresh(path, op),
            RefreshPolicy::Directory(r) => r.should_refresh(path, op),
        }
    }
}

impl From<SymlinkRefresher> for RefreshPolicy {
    fn from(r: SymlinkRefresher) -> Self {
        RefreshPolicy::Symlink(r)
    }
}

impl From<DirectoryRefresher> for RefreshPolicy {
    fn from(r: DirectoryRefresher) -> Self {
        RefreshPolicy::Directory(r)
    }
}
