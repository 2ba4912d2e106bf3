//! Cache configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (STASH_*)
//! 2. TOML config file (if STASH_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Cache configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (STASH_*)
/// 2. TOML config file (if STASH_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Root directory holding cache entries.
    ///
    /// Set via STASH_CACHE_DIR environment variable.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Whether lookups and writes happen at all.
    ///
    /// Set via STASH_ENABLED environment variable. When false every
    /// computation runs and nothing is persisted.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Subdirectory of `cache_dir` to scope entries to.
    ///
    /// Set via STASH_NAMESPACE environment variable.
    #[serde(default)]
    pub namespace: Option<String>,

    /// JSON file holding API keys.
    ///
    /// Set via STASH_SECRETS_FILE environment variable.
    #[serde(default = "default_secrets_file")]
    pub secrets_file: PathBuf,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache")
}

fn default_secrets_file() -> PathBuf {
    PathBuf::from("secrets.json")
}

fn default_true() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            enabled: true,
            namespace: None,
            secrets_file: default_secrets_file(),
        }
    }
}

impl CacheConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `STASH_`
    /// 2. TOML file from `STASH_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered sources `load` reads, for callers that adjust values
    /// before validating.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("STASH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(env_provider())
    }

    /// Extract and validate configuration from a caller-built figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` if extraction fails, or the
    /// validation error.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config = Self::extract(&figment)?;

        config.validate()?;

        Ok(config)
    }

    /// Extract without validating. Call [`CacheConfig::validate`] once the
    /// final values are in place.
    pub fn extract(figment: &Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))
    }
}

/// `STASH_*` variables, minus the config file pointer and `STASH_SECRET_*`.
fn env_provider() -> Env {
    Env::prefixed("STASH_")
        .ignore(&["CONFIG_FILE"])
        .filter(|key| !key.as_str().to_ascii_lowercase().starts_with("secret_"))
        .map(|key| key.as_str().to_lowercase().into())
}
