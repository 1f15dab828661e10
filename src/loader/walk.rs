//! Directory walk that builds a snapshot.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use walkdir::{DirEntry, WalkDir};

use crate::observability::metrics::LoaderStats;
use crate::snapshot::{Entry, RandomGenerator, Snapshot};

/// Walk `target_dir` and build a snapshot with one entry per file.
///
/// A file that cannot be read or keyed is counted as a load failure and
/// skipped; the walk itself never aborts.
pub fn load_snapshot(
    target_dir: &Path,
    ignore_dotfiles: bool,
    random: Arc<dyn RandomGenerator>,
    stats: &LoaderStats,
) -> Snapshot {
    let mut builder = Snapshot::builder().with_random(random);

    let walker = WalkDir::new(target_dir)
        .into_iter()
        .filter_entry(|e| !(ignore_dotfiles && e.depth() > 0 && is_hidden(e)));

    for item in walker {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) => {
                stats.record_failure();
                tracing::warn!(path = ?e.path(), error = %e, "runtime: error processing path");
                continue;
            }
        };

        let path = entry.path();
        tracing::debug!(path = %path.display(), "runtime: processing");

        if entry.file_type().is_dir() {
            continue;
        }

        let contents = match fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                stats.record_failure();
                tracing::warn!(path = %path.display(), error = %e, "runtime: error reading file");
                continue;
            }
        };

        let key = match key_for(target_dir, path) {
            Some(key) => key,
            None => {
                stats.record_failure();
                tracing::warn!(path = %path.display(), "runtime: error computing key");
                continue;
            }
        };

        // Symlinked files report the link's own mtime.
        let modified = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .unwrap_or(UNIX_EPOCH);

        let value = Entry::new(contents, modified);
        tracing::debug!(key = %key, uint = value.uint64_valid, "runtime: adding key");
        builder.insert(key, value);
    }

    builder.build()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Key for `path`: its path relative to `root` with separators replaced by `.`.
pub fn key_for(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("."))
}
