//! API key loading.
//!
//! Secrets come from a flat JSON object file, overridden by `STASH_SECRET_*`
//! environment variables. Values are handed out explicitly to whoever needs
//! them; nothing is stored globally.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};

use crate::ConfigError;

const ENV_PREFIX: &str = "STASH_SECRET_";

/// Named API keys.
#[derive(Clone, Default)]
pub struct Secrets {
    source: PathBuf,
    values: BTreeMap<String, String>,
}

impl Secrets {
    /// Load secrets from `path` and the environment.
    ///
    /// A missing file is treated as empty so that environment-only setups
    /// work; a file that is not a flat JSON object of strings is an error.
    /// Environment values are taken verbatim, so `STASH_SECRET_PIN=0042`
    /// stays the string `"0042"`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let env: BTreeMap<String, String> = Env::prefixed(ENV_PREFIX)
            .iter()
            .map(|(key, value)| (key.as_str().to_lowercase(), value))
            .collect();

        let figment = Figment::new().merge(Json::file(path)).merge(Serialized::defaults(env));

        Self::from_figment(path, figment)
    }

    fn from_figment(path: &Path, figment: Figment) -> Result<Self, ConfigError> {
        let values: BTreeMap<String, String> =
            figment.extract().map_err(|e| ConfigError::LoadFailed(format!("{}: {e}", path.display())))?;

        tracing::debug!(source = %path.display(), count = values.len(), "Loaded secrets");

        Ok(Self { source: path.to_path_buf(), values })
    }

    /// Value for `name`, if present and non-empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Value for `name`, or a `Missing` error saying where to set it.
    pub fn require(&self, name: &str) -> Result<&str, ConfigError> {
        self.get(name).ok_or_else(|| ConfigError::Missing {
            field: name.to_string(),
            hint: format!(
                "add \"{name}\" to {} or set {ENV_PREFIX}{}",
                self.source.display(),
                name.to_uppercase()
            ),
        })
    }

    /// Names of the available secrets.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().filter(|(_, v)| !v.is_empty()).map(|(k, _)| k.as_str())
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("source", &self.source)
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
