//! Semantic validation of a parsed config.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{RefresherKind, WatchConfig};

/// A single semantic problem in the config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("directory refresher needs at least one watch op")]
    EmptyWatchOps,

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("root_path and subdirectory must both be set or both be empty")]
    PartialRuntimePath,
}

/// Collect every problem rather than stopping at the first.
pub fn validate_config(config: &WatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let runtime = &config.runtime;

    if runtime.refresher == RefresherKind::Directory
        && runtime.watch_ops.as_ref().is_some_and(|ops| ops.is_empty())
    {
        errors.push(ValidationError::EmptyWatchOps);
    }

    if runtime.root_path.is_empty() != runtime.subdirectory.is_empty() {
        errors.push(ValidationError::PartialRuntimePath);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&WatchConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = WatchConfig::default();
        config.runtime.refresher = RefresherKind::Directory;
        config.runtime.watch_ops = Some(Vec::new());
        config.runtime.root_path = "/srv".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "localhost".into();

        assert_eq!(
            validate_config(&config),
            Err(vec![
                ValidationError::EmptyWatchOps,
                ValidationError::PartialRuntimePath,
                ValidationError::MetricsAddress("localhost".into()),
            ])
        );
    }
}
