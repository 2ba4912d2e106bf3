//! Configuration validation rules.
//!
//! This module provides validation logic for `CacheConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::cache::key::validate_segment;
use crate::config::CacheConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl CacheConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_dir` is empty
    /// - `secrets_file` is empty
    /// - `namespace` is not a single safe path segment
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "cache_dir".into(), reason: "must not be empty".into() });
        }

        if self.secrets_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "secrets_file".into(), reason: "must not be empty".into() });
        }

        if let Some(namespace) = &self.namespace {
            validate_segment(namespace)
                .map_err(|e| ConfigError::Invalid { field: "namespace".into(), reason: e.to_string() })?;
        }

        if !self.enabled {
            tracing::warn!(
                cache_dir = %self.cache_dir.display(),
                "Cache is disabled; every call will reach the upstream service"
            );
        }

        Ok(())
    }
}
