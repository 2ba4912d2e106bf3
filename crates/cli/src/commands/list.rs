//! `stash list` and `stash stats` implementations.

use std::path::PathBuf;

use serde::Serialize;
use stash_core::{DirStore, EntryInfo};

use crate::error::CliError;

#[derive(Debug, Clone, Serialize)]
pub struct ListOutput {
    pub dir: PathBuf,
    pub entries: Vec<EntryInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsOutput {
    pub dir: PathBuf,
    pub entries: usize,
    pub total_bytes: u64,
    pub namespaces: Vec<String>,
}

pub async fn list_impl(store: &DirStore) -> Result<ListOutput, CliError> {
    let entries = store.list().await?;
    Ok(ListOutput { dir: store.dir().to_path_buf(), entries })
}

pub async fn stats_impl(store: &DirStore) -> Result<StatsOutput, CliError> {
    let stats = store.stats().await?;
    let namespaces = store.namespaces().await?;
    Ok(StatsOutput {
        dir: store.dir().to_path_buf(),
        entries: stats.entries,
        total_bytes: stats.total_bytes,
        namespaces,
    })
}
