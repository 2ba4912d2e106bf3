//! `stash key` implementation.
//!
//! Prints the content fingerprint a file would be cached under.

use std::path::PathBuf;

use serde::Serialize;
use stash_core::CacheKey;

use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct FingerprintParams {
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct FingerprintOutput {
    pub file: PathBuf,
    pub key: CacheKey,
    pub entry_file: String,
}

pub async fn fingerprint_impl(params: FingerprintParams) -> Result<FingerprintOutput, CliError> {
    let key = CacheKey::from_file(&params.file).await?;
    let entry_file = key.file_name();
    Ok(FingerprintOutput { file: params.file, key, entry_file })
}
