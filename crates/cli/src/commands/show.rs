//! `stash show` implementation.
//!
//! Retrieves a stored entry by key.

use std::path::PathBuf;

use serde::Serialize;
use stash_core::{CacheKey, DirStore, Error};

use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct ShowParams {
    /// Key in display form: hex digest, `name:<id>` or `batch:<id>`.
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowOutput {
    pub path: PathBuf,
    pub entry: serde_json::Value,
}

pub async fn show_impl(store: &DirStore, params: ShowParams) -> Result<ShowOutput, CliError> {
    let key: CacheKey = params.key.parse()?;
    let entry = store
        .read_raw(&key)
        .await?
        .ok_or_else(|| Error::CacheMiss(key.to_string()))?;

    Ok(ShowOutput { path: store.path_for(&key), entry })
}
