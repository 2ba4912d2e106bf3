//! Whole-batch caching under one well-known key.
//!
//! This is the coarse mode: the entry records that a batch ran and what it
//! produced, not which inputs went into it. Changing the inputs does not
//! invalidate the entry; call [`BatchCache::reset`] for that.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::key::CacheKey;
use super::result_cache::ResultCache;
use crate::Error;

/// A [`ResultCache`] pinned to a single `batch:<id>` key.
#[derive(Debug, Clone)]
pub struct BatchCache {
    cache: ResultCache,
    key: CacheKey,
}

impl BatchCache {
    pub fn new(cache: ResultCache, id: &str) -> Result<Self, Error> {
        Ok(Self { cache, key: CacheKey::batch(id)? })
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Return the stored batch result, or run the batch once and store it.
    pub async fn get_or_compute<T, E, F, Fut>(&self, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<Error>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cache.get_or_compute(&self.key, compute).await
    }

    /// Whether a result for this batch is stored.
    pub async fn has_run(&self) -> Result<bool, Error> {
        self.cache.contains(&self.key).await
    }

    /// Forget the stored result so the next call reruns the batch.
    pub async fn reset(&self) -> Result<bool, Error> {
        self.cache.invalidate(&self.key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_batch_runs_once() {
        let tmp = tempfile::tempdir().unwrap();
        let batch = BatchCache::new(ResultCache::new(tmp.path()), "categories").unwrap();
        assert!(!batch.has_run().await.unwrap());

        let first: BTreeMap<String, Vec<String>> = batch
            .get_or_compute(|| async {
                let mut m = BTreeMap::new();
                m.insert("people".to_string(), vec!["2024-11-12_report-00.txt".to_string()]);
                Ok::<_, Error>(m)
            })
            .await
            .unwrap();

        assert!(batch.has_run().await.unwrap());

        let second: BTreeMap<String, Vec<String>> =
            batch.get_or_compute(|| async { Ok::<_, Error>(BTreeMap::new()) }).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_reset_reruns_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let batch = BatchCache::new(ResultCache::new(tmp.path()), "polish-names").unwrap();

        let _: Vec<String> = batch
            .get_or_compute(|| async { Ok::<_, Error>(vec!["Barbara".to_string()]) })
            .await
            .unwrap();
        assert!(batch.reset().await.unwrap());
        assert!(!batch.has_run().await.unwrap());

        let names: Vec<String> = batch
            .get_or_compute(|| async { Ok::<_, Error>(vec!["Aleksander".to_string()]) })
            .await
            .unwrap();
        assert_eq!(names, vec!["Aleksander".to_string()]);
    }

    #[test]
    fn test_batch_key_is_distinct_from_named() {
        let batch = BatchCache::new(ResultCache::new("/tmp/unused"), "run").unwrap();
        assert_eq!(batch.key().to_string(), "batch:run");
        assert_ne!(batch.key(), &CacheKey::named("run").unwrap());
    }

    #[test]
    fn test_batch_rejects_bad_id() {
        assert!(BatchCache::new(ResultCache::new("/tmp/unused"), "../up").is_err());
    }
}
