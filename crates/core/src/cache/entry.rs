//! Persisted entry envelope.

use serde::{Deserialize, Serialize};

use super::key::CacheKey;

/// A cached result as written to disk.
///
/// `key` holds the display form of the [`CacheKey`] so an operator reading
/// the file can tell which input it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub key: String,
    pub created_at: String,
    pub value: T,
}

impl<T> CacheEntry<T> {
    /// Wrap `value` with the key and the current UTC time.
    pub fn new(key: &CacheKey, value: T) -> Self {
        Self { key: key.to_string(), created_at: chrono::Utc::now().to_rfc3339(), value }
    }
}

/// Summary of a stored entry, without its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub key: CacheKey,
    pub size_bytes: u64,
    /// RFC 3339 modification time of the entry file, when the platform reports one.
    pub modified: Option<String>,
}

/// Aggregate size of one store directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub entries: usize,
    pub total_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_display_key() {
        let key = CacheKey::named("facts.txt").unwrap();
        let entry = CacheEntry::new(&key, "keywords".to_string());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["key"], "name:facts.txt");
        assert_eq!(json["value"], "keywords");
        assert!(chrono::DateTime::parse_from_rfc3339(json["created_at"].as_str().unwrap()).is_ok());
    }
}
