//! Shared utilities for loader integration tests.

use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

use fs_runtime::{Loader, RuntimeSnapshot};

#[allow(dead_code)]
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Move a file with `text` into place at `path`.
///
/// Writing in a staging directory first and renaming means the watcher never
/// sees an empty or partial file, the same way deploys symlink files into place.
pub fn make_file_in_dir(staging: &Path, path: &Path, text: &str) {
    let tmp = tempfile::tempdir_in(staging).unwrap();
    let tmp_file = tmp.path().join(path.file_name().unwrap());
    fs::write(&tmp_file, text).unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::rename(&tmp_file, path).unwrap();
}

/// Consume update signals until `check` passes on the current snapshot.
#[allow(dead_code)]
pub async fn wait_for<F>(loader: &Loader, updates: &mut mpsc::Receiver<()>, check: F)
where
    F: Fn(&dyn RuntimeSnapshot) -> bool,
{
    let deadline = Instant::now() + TIMEOUT;
    while !check(&*loader.current()) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, updates.recv()).await {
            Ok(Some(())) => {}
            Ok(None) => panic!("update channel closed"),
            Err(_) => panic!("timed out after {:?} waiting for snapshot", TIMEOUT),
        }
    }
}
