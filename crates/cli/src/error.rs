//! Structured errors for the stash CLI.
//!
//! Each kind maps to a distinct process exit code so scripts can tell a
//! missing entry apart from a broken cache directory.

use stash_core::{ConfigError, Error};

/// Structured errors for the stash CLI.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid command parameters.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded or holds invalid values.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Error reported by the cache library.
    #[error(transparent)]
    Cache(#[from] Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidInput(_) => 64,
            CliError::Config(ConfigError::Invalid { .. } | ConfigError::Missing { .. }) => 64,
            CliError::Config(ConfigError::LoadFailed(_)) => 78,
            CliError::Cache(Error::InvalidKey(_)) => 64,
            CliError::Cache(Error::CacheMiss(_)) => 2,
            CliError::Cache(Error::Storage { .. }) => 74,
            CliError::Cache(Error::Corrupt { .. }) => 65,
            CliError::Cache(Error::Serialize(_)) => 70,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_distinguish_miss_from_storage() {
        let miss = CliError::from(Error::CacheMiss("name:a".into()));
        let storage = CliError::from(Error::Storage {
            path: "/x".into(),
            source: std::io::Error::other("boom"),
        });
        assert_eq!(miss.exit_code(), 2);
        assert_eq!(storage.exit_code(), 74);
        assert_ne!(miss.exit_code(), storage.exit_code());
    }

    #[test]
    fn test_cache_error_display_passes_through() {
        let err = CliError::from(Error::CacheMiss("name:a".into()));
        assert_eq!(err.to_string(), "CACHE_MISS: name:a");
    }

    #[test]
    fn test_config_errors_map_to_input_and_config_codes() {
        let invalid = CliError::from(ConfigError::Invalid { field: "namespace".into(), reason: "bad".into() });
        let load = CliError::from(ConfigError::LoadFailed("stash.toml: expected a boolean".into()));
        assert_eq!(invalid.exit_code(), 64);
        assert_eq!(load.exit_code(), 78);
    }
}
