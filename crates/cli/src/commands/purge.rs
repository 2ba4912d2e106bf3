//! `stash remove` / `stash clear` implementation.
//!
//! Deletes one entry by key, or every entry of the selected namespace.

use serde::Serialize;
use stash_core::{CacheKey, DirStore};

use crate::error::CliError;

#[derive(Debug, Clone, Default)]
pub struct PurgeParams {
    /// Delete only this key.
    pub key: Option<String>,

    /// Delete every entry in the directory.
    pub all: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurgeOutput {
    /// Number of entries deleted.
    pub deleted: u64,
}

pub async fn purge_impl(store: &DirStore, params: PurgeParams) -> Result<PurgeOutput, CliError> {
    let deleted = match (params.key, params.all) {
        (Some(_), true) => {
            return Err(CliError::InvalidInput("a single key and all entries cannot both be selected".to_string()));
        }
        (None, false) => {
            return Err(CliError::InvalidInput("either a key or all entries must be selected".to_string()));
        }
        (Some(key), false) => {
            let key: CacheKey = key.parse()?;
            u64::from(store.remove(&key).await?)
        }
        (None, true) => store.clear().await?,
    };

    tracing::info!(dir = %store.dir().display(), deleted, "Purged cache entries");

    Ok(PurgeOutput { deleted })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (tempfile::TempDir, DirStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path());
        store.write(&CacheKey::from_bytes(b"a"), &"one").await.unwrap();
        store.write(&CacheKey::named("notes.txt").unwrap(), &"two").await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_purge_single_key() {
        let (_dir, store) = seeded().await;
        let params = PurgeParams { key: Some("name:notes.txt".into()), all: false };

        let output = purge_impl(&store, params).await.unwrap();
        assert_eq!(output.deleted, 1);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_purge_absent_key() {
        let (_dir, store) = seeded().await;
        let params = PurgeParams { key: Some("name:other".into()), all: false };

        let output = purge_impl(&store, params).await.unwrap();
        assert_eq!(output.deleted, 0);
    }

    #[tokio::test]
    async fn test_purge_all() {
        let (_dir, store) = seeded().await;
        let output = purge_impl(&store, PurgeParams { key: None, all: true }).await.unwrap();
        assert_eq!(output.deleted, 2);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_no_params() {
        let (_dir, store) = seeded().await;
        let result = purge_impl(&store, PurgeParams::default()).await;
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_purge_conflicting_params() {
        let (_dir, store) = seeded().await;
        let params = PurgeParams { key: Some("name:notes.txt".into()), all: true };
        let result = purge_impl(&store, params).await;
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
        assert_eq!(store.list().await.unwrap().len(), 2);
    }
}
