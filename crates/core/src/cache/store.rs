//! Directory store: one pretty-printed JSON file per key.
//!
//! Writes are plain overwrites. There is no lock and no rename-on-write, so
//! two processes writing the same key at once must be serialized by the
//! caller.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::entry::{CacheEntry, EntryInfo, StoreStats};
use super::key::{CacheKey, validate_segment};
use crate::Error;

/// Store handle for one cache directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store for a named subdirectory.
    pub fn child(&self, namespace: &str) -> Result<Self, Error> {
        validate_segment(namespace)?;
        Ok(Self::new(self.dir.join(namespace)))
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Read and decode the entry for `key`.
    ///
    /// Returns `Ok(None)` only when no file exists. Unreadable files,
    /// invalid JSON, values that do not decode as `T`, and entries recorded
    /// under a different key are errors.
    pub async fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<CacheEntry<T>>, Error> {
        let path = self.path_for(key);
        let Some(text) = self.read_file(&path).await? else {
            return Ok(None);
        };

        let entry: CacheEntry<T> =
            serde_json::from_str(&text).map_err(|e| Error::corrupt(&path, e.to_string()))?;

        let expected = key.to_string();
        if entry.key != expected {
            return Err(Error::corrupt(
                &path,
                format!("entry recorded for {:?}, expected {expected:?}", entry.key),
            ));
        }

        Ok(Some(entry))
    }

    /// Read the stored envelope as untyped JSON.
    pub async fn read_raw(&self, key: &CacheKey) -> Result<Option<serde_json::Value>, Error> {
        let path = self.path_for(key);
        let Some(text) = self.read_file(&path).await? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::corrupt(&path, e.to_string()))
    }

    /// Persist `value` under `key`, replacing any previous entry.
    pub async fn write<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<PathBuf, Error> {
        let json = serde_json::to_string_pretty(&CacheEntry::new(key, value))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::storage(&self.dir, e))?;

        let path = self.path_for(key);
        tokio::fs::write(&path, json).await.map_err(|e| Error::storage(&path, e))?;
        Ok(path)
    }

    /// Delete the entry for `key`. Returns false when nothing was stored.
    pub async fn remove(&self, key: &CacheKey) -> Result<bool, Error> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::storage(&path, e)),
        }
    }

    pub async fn contains(&self, key: &CacheKey) -> Result<bool, Error> {
        let path = self.path_for(key);
        tokio::fs::try_exists(&path).await.map_err(|e| Error::storage(&path, e))
    }

    /// Entries in this directory, sorted by key.
    ///
    /// A directory that does not exist yet is an empty store. Subdirectories
    /// and files the store did not write are skipped.
    pub async fn list(&self) -> Result<Vec<EntryInfo>, Error> {
        let mut infos = Vec::new();
        let Some(mut dir) = self.open_dir().await? else {
            return Ok(infos);
        };

        while let Some(dirent) = dir.next_entry().await.map_err(|e| Error::storage(&self.dir, e))? {
            let path = dirent.path();
            let metadata = dirent.metadata().await.map_err(|e| Error::storage(&path, e))?;
            if !metadata.is_file() {
                continue;
            }

            let file_name = dirent.file_name();
            let Some(key) = file_name.to_str().and_then(CacheKey::from_file_name) else {
                tracing::debug!(path = %path.display(), "Skipping foreign file in cache directory");
                continue;
            };

            let modified = metadata
                .modified()
                .ok()
                .map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339());

            infos.push(EntryInfo { key, size_bytes: metadata.len(), modified });
        }

        infos.sort_by(|a, b| a.key.to_string().cmp(&b.key.to_string()));
        Ok(infos)
    }

    /// Names of the namespace subdirectories, sorted.
    pub async fn namespaces(&self) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();
        let Some(mut dir) = self.open_dir().await? else {
            return Ok(names);
        };

        while let Some(dirent) = dir.next_entry().await.map_err(|e| Error::storage(&self.dir, e))? {
            let file_type = dirent.file_type().await.map_err(|e| Error::storage(dirent.path(), e))?;
            if !file_type.is_dir() {
                continue;
            }
            if let Some(name) = dirent.file_name().to_str()
                && validate_segment(name).is_ok()
            {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Delete every entry in this directory. Namespaces below it are kept.
    pub async fn clear(&self) -> Result<u64, Error> {
        let mut deleted = 0u64;
        for info in self.list().await? {
            if self.remove(&info.key).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    pub async fn stats(&self) -> Result<StoreStats, Error> {
        let infos = self.list().await?;
        Ok(StoreStats { entries: infos.len(), total_bytes: infos.iter().map(|i| i.size_bytes).sum() })
    }

    async fn read_file(&self, path: &Path) -> Result<Option<String>, Error> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(Error::corrupt(path, e.to_string())),
            Err(e) => Err(Error::storage(path, e)),
        }
    }

    async fn open_dir(&self) -> Result<Option<tokio::fs::ReadDir>, Error> {
        match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => Ok(Some(dir)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(&self.dir, e)),
        }
    }
}
