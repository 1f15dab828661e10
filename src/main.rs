//! runtime-watch
//!
//! Loads a runtime directory tree, keeps it live, and reports every reload.
//!
//! ```text
//!   /srv/runtime/current ──▶ app/feature.enabled   (symlink swapped on deploy)
//!                            app/limits/rps
//!                  │
//!                  ▼
//!        fs_runtime::loader ──▶ snapshot ──▶ log / --dump
//! ```

use std::path::PathBuf;
use clap::Parser;
use tokio::sync::mpsc;

use fs_runtime::config::loader::{load_config, ConfigError};
use fs_runtime::config::validation::validate_config;
use fs_runtime::config::WatchConfig;
use fs_runtime::lifecycle::signals::wait_for_termination;
use fs_runtime::observability::{logging, metrics};
use fs_runtime::RuntimeSnapshot;

#[derive(Parser)]
#[command(name = "runtime-watch")]
#[command(about = "Watch a runtime directory tree and report each reload", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override runtime.root_path
    #[arg(long)]
    root: Option<String>,

    /// Override runtime.subdirectory
    #[arg(long)]
    subdirectory: Option<String>,

    /// Print every key and value after each reload
    #[arg(long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => WatchConfig::default(),
    };
    if let Some(root) = cli.root {
        config.runtime.root_path = root;
    }
    if let Some(subdirectory) = cli.subdirectory {
        config.runtime.subdirectory = subdirectory;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("runtime-watch v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let runtime = &config.runtime;
    tracing::info!(
        root_path = %runtime.root_path,
        subdirectory = %runtime.subdirectory,
        refresher = ?runtime.refresher,
        "Configuration loaded"
    );

    let loader = fs_runtime::loader::new(
        &runtime.root_path,
        &runtime.subdirectory,
        runtime.refresh_policy(),
        runtime.loader_options(),
    )?;

    let (tx, mut updates) = mpsc::channel(1);
    loader.add_update_callback(tx)?;
    report(loader.snapshot().as_ref(), cli.dump);

    let terminate = wait_for_termination();
    tokio::pin!(terminate);

    loop {
        tokio::select! {
            Some(()) = updates.recv() => report(loader.snapshot().as_ref(), cli.dump),
            _ = &mut terminate => break,
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn report(snapshot: &dyn RuntimeSnapshot, dump: bool) {
    tracing::info!(values = snapshot.len(), "Runtime snapshot published");
    if dump {
        let mut entries = snapshot.entries();
        entries.sort_by_key(|(key, _)| *key);
        for (key, entry) in entries {
            println!("{} = {:?}", key, entry.string_value.trim());
        }
    }
}
