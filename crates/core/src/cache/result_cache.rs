//! Get-or-compute over a [`DirStore`].

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::key::CacheKey;
use super::store::DirStore;
use crate::{CacheConfig, Error};

/// Hit/miss counts for the lifetime of one cache handle and its namespaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCounters {
    pub hits: u64,
    pub misses: u64,
    /// Calls made while the cache was disabled.
    pub bypassed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    bypassed: AtomicU64,
}

/// Persistent cache for results of expensive external calls.
///
/// A value is computed at most once per key for as long as its entry file
/// exists, across process restarts.
#[derive(Debug, Clone)]
pub struct ResultCache {
    store: DirStore,
    enabled: bool,
    counters: Arc<Counters>,
}

impl ResultCache {
    /// Open a cache rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { store: DirStore::new(dir), enabled: true, counters: Arc::default() }
    }

    /// Build a cache from loaded configuration, applying its namespace and
    /// enabled flag.
    pub fn from_config(config: &CacheConfig) -> Result<Self, Error> {
        let mut cache = Self::new(&config.cache_dir);
        if let Some(namespace) = &config.namespace {
            cache = cache.namespace(namespace)?;
        }
        cache.enabled = config.enabled;
        Ok(cache)
    }

    /// A cache scoped to a subdirectory. Counters are shared with `self`.
    pub fn namespace(&self, name: &str) -> Result<Self, Error> {
        Ok(Self { store: self.store.child(name)?, enabled: self.enabled, counters: Arc::clone(&self.counters) })
    }

    pub fn store(&self) -> &DirStore {
        &self.store
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn counters(&self) -> CacheCounters {
        CacheCounters {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            bypassed: self.counters.bypassed.load(Ordering::Relaxed),
        }
    }

    /// Return the stored value for `key`, or run `compute` once and store
    /// its result.
    ///
    /// An error from `compute` is returned unchanged and nothing is written.
    /// Storage failures are converted into the caller's error type through
    /// `From<Error>`; they are never treated as a miss.
    ///
    /// When the cache is disabled, `compute` always runs and the store is
    /// neither read nor written.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &CacheKey, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<Error>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.enabled {
            self.counters.bypassed.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "Cache disabled, computing directly");
            return compute().await;
        }

        match self.store.read::<T>(key).await {
            Ok(Some(entry)) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(%key, created_at = %entry.created_at, "Cache hit");
                return Ok(entry.value);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%key, error = %e, "Cache read failed");
                return Err(e.into());
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!(%key, "Cache miss, computing");

        let value = compute().await?;

        match self.write_checked(key, &value).await {
            Ok(path) => info!(%key, path = %path.display(), "Stored cache entry"),
            Err(e) => {
                warn!(%key, error = %e, "Cache write failed");
                return Err(e.into());
            }
        }

        Ok(value)
    }

    /// Look up a stored value without computing.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>, Error> {
        Ok(self.store.read::<T>(key).await?.map(|entry| entry.value))
    }

    /// Store a value computed elsewhere.
    pub async fn put<T: Serialize + DeserializeOwned>(&self, key: &CacheKey, value: &T) -> Result<(), Error> {
        self.write_checked(key, value).await.map(|_| ())
    }

    pub async fn contains(&self, key: &CacheKey) -> Result<bool, Error> {
        self.store.contains(key).await
    }

    /// Drop the entry for `key` so the next lookup recomputes it.
    pub async fn invalidate(&self, key: &CacheKey) -> Result<bool, Error> {
        let removed = self.store.remove(key).await?;
        if removed {
            info!(%key, "Invalidated cache entry");
        }
        Ok(removed)
    }

    /// Write `value` only if its JSON form decodes back to `T`. serde_json
    /// writes non-finite floats as `null`.
    async fn write_checked<T>(&self, key: &CacheKey, value: &T) -> Result<PathBuf, Error>
    where
        T: Serialize + DeserializeOwned,
    {
        let json = serde_json::to_string(value)?;
        serde_json::from_str::<T>(&json)?;
        self.store.write(key, value).await
    }
}
