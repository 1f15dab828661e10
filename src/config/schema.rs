//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::loader::{DirectoryRefresher, FileSystemOp, LoaderOptions, RefreshPolicy, SymlinkRefresher};

/// Root configuration for the `runtime-watch` process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WatchConfig {
    /// Which runtime tree to load.
    pub runtime: RuntimeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Refresh policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RefresherKind {
    /// Watch the parent of `root_path` for an atomic symlink swap.
    #[default]
    Symlink,
    /// Watch `root_path/subdirectory` directly.
    Directory,
}

/// Runtime tree configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Root of the runtime tree (e.g., "/srv/runtime/current").
    pub root_path: String,

    /// Application subdirectory under the root.
    pub subdirectory: String,

    /// Refresh policy.
    pub refresher: RefresherKind,

    /// Ops that trigger a reload for the directory refresher.
    /// `None` keeps the refresher's defaults.
    pub watch_ops: Option<Vec<FileSystemOp>>,

    /// Skip files and directories starting with `.`.
    pub ignore_dotfiles: bool,

    /// Prefix for loader metric names.
    pub stats_scope: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            root_path: String::new(),
            subdirectory: String::new(),
            refresher: RefresherKind::default(),
            watch_ops: None,
            ignore_dotfiles: false,
            stats_scope: "runtime".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Build the configured refresh policy.
    pub fn refresh_policy(&self) -> RefreshPolicy {
        match self.refresher {
            RefresherKind::Symlink => SymlinkRefresher::new(&self.root_path).into(),
            RefresherKind::Directory => {
                let mut refresher = DirectoryRefresher::new();
                if let Some(ops) = &self.watch_ops {
                    refresher.watch_file_system_ops(ops.iter().copied());
                }
                refresher.into()
            }
        }
    }

    pub fn loader_options(&self) -> LoaderOptions {
        let options = if self.ignore_dotfiles {
            LoaderOptions::ignore_dotfiles()
        } else {
            LoaderOptions::allow_dotfiles()
        };
        options.with_stats_scope(&self.stats_scope)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
