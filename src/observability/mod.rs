//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Loader and walk produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (load counters, value gauge)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
