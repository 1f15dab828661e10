//! Loader backed by a watched directory tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use arc_swap::ArcSwap;
use notify::RecommendedWatcher;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::lifecycle::{Shutdown, ShutdownListener};
use crate::loader::error::LoaderError;
use crate::loader::fanout::UpdateFanout;
use crate::loader::refresher::Refresher;
use crate::loader::walk::load_snapshot;
use crate::loader::watcher::{classify, RuntimeWatcher, WatchEvent};
use crate::loader::{LoaderOptions, RuntimeLoader};
use crate::observability::metrics::{LoaderStats, LoaderStatsSnapshot};
use crate::snapshot::{RandomGenerator, RuntimeSnapshot, Snapshot};

struct LoaderInner {
    target_dir: PathBuf,
    current: ArcSwap<Snapshot>,
    fanout: UpdateFanout,
    stats: LoaderStats,
    ignore_dotfiles: bool,
    random: Arc<dyn RandomGenerator>,
    shutdown: Shutdown,
}

impl LoaderInner {
    /// Build, publish, and announce a new snapshot. Only the loader's own
    /// initial build and event task call this, never concurrently.
    fn on_runtime_changed(&self) {
        tracing::debug!(path = %self.target_dir.display(), "runtime changed, loading new snapshot");

        let snapshot = load_snapshot(
            &self.target_dir,
            self.ignore_dotfiles,
            self.random.clone(),
            &self.stats,
        );

        self.stats.record_attempt();
        self.stats.set_num_values(snapshot.len());
        self.current.store(Arc::new(snapshot));

        self.fanout.signal();
    }
}

/// Watches `root/sub` and serves the latest snapshot of it.
///
/// Cloning is cheap; all clones share the same snapshot and background task.
#[derive(Clone)]
pub struct Loader {
    inner: Arc<LoaderInner>,
}

impl Loader {
    /// Watch the directory chosen by `refresher`, load `root_path/sub_path`
    /// once, then reload in the background whenever the refresher says so.
    ///
    /// Must be called within a tokio runtime.
    pub fn start<R: Refresher>(
        root_path: impl AsRef<Path>,
        sub_path: impl AsRef<Path>,
        mut refresher: R,
        options: LoaderOptions,
    ) -> Result<Self, LoaderError> {
        let handle = Handle::try_current().map_err(|_| LoaderError::NoRuntime)?;
        let root_path = root_path.as_ref();
        let sub_path = sub_path.as_ref();

        let watched = refresher.watch_directory(root_path, sub_path);
        let (watcher, events) = RuntimeWatcher::new(&watched);
        let watcher = watcher.run()?;

        let shutdown = Shutdown::new();
        let inner = Arc::new(LoaderInner {
            target_dir: root_path.join(sub_path),
            current: ArcSwap::from_pointee(Snapshot::empty()),
            fanout: UpdateFanout::new(Some(handle.clone()), shutdown.clone()),
            stats: LoaderStats::new(&options.stats_scope),
            ignore_dotfiles: options.ignore_dotfiles,
            random: options.random,
            shutdown,
        });

        inner.on_runtime_changed();

        let stop = inner.shutdown.subscribe();
        handle.spawn(consume_events(inner.clone(), watcher, events, refresher, stop));

        tracing::info!(
            target_dir = %inner.target_dir.display(),
            watched = %watched.display(),
            values = inner.stats.snapshot().num_values,
            "Runtime loader started"
        );

        Ok(Self { inner })
    }

    /// The latest published snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.inner.current.load_full()
    }

    pub fn stats(&self) -> LoaderStatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Directory the snapshot is built from.
    pub fn target_directory(&self) -> &Path {
        &self.inner.target_dir
    }

    /// Stop the event task and all update forwarders. The last published
    /// snapshot stays readable.
    pub fn shutdown(&self) {
        tracing::info!(target_dir = %self.inner.target_dir.display(), "Runtime loader stopping");
        self.inner.shutdown.trigger();
    }
}

impl RuntimeLoader for Loader {
    fn snapshot(&self) -> Arc<dyn RuntimeSnapshot> {
        self.current()
    }

    fn add_update_callback(&self, callback: mpsc::Sender<()>) -> Result<(), LoaderError> {
        self.inner.fanout.subscribe(callback)
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("target_dir", &self.inner.target_dir)
            .field("stats", &self.inner.stats)
            .finish()
    }
}

/// Event loop: one refresh per qualifying event, strictly sequential.
/// Owns the watcher so the OS watch lives exactly as long as the loop.
async fn consume_events<R: Refresher>(
    inner: Arc<LoaderInner>,
    _watcher: RecommendedWatcher,
    mut events: mpsc::UnboundedReceiver<WatchEvent>,
    refresher: R,
    mut shutdown: ShutdownListener,
) {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(Ok(event)) => {
                    tracing::debug!(?event, "runtime: got event");
                    let refresh = classify(&event)
                        .iter()
                        .any(|(path, op)| refresher.should_refresh(path, *op));
                    if refresh {
                        let inner = inner.clone();
                        if let Err(e) = tokio::task::spawn_blocking(move || inner.on_runtime_changed()).await {
                            tracing::error!(error = %e, "runtime refresh task failed");
                        }
                    }
                }
                Some(Err(e)) => tracing::warn!(error = %e, "runtime watch error"),
                None => break,
            },
            _ = shutdown.recv() => {
                tracing::info!("Runtime event loop received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
