//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Loader::shutdown() / signal → latched watch flag → event task + forwarders exit
//!     (tasks started after the trigger exit at once)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → host process stops its loaders
//! ```
//!
//! # Design Decisions
//! - Background tasks run until told to stop; there is no implicit timeout
//! - One flag per loader so loaders can be stopped independently

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownListener};
