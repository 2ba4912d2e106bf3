//! Cache key derivation.
//!
//! Byte payloads are keyed by the SHA-256 of their full content. Named and
//! batch keys exist for inputs whose identity is a stable identifier, and
//! for whole-run results that have no per-item key at all.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::Error;

const NAMED_PREFIX: &str = "name";
const BATCH_PREFIX: &str = "batch";
const FILE_EXT: &str = ".json";
const MAX_SEGMENT_LEN: usize = 128;
const READ_CHUNK: usize = 64 * 1024;

/// Identifies one cache entry.
///
/// The display form and the file name are both injective across kinds:
/// fingerprints are bare hex, the other kinds carry a prefix that can never
/// appear in a hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// SHA-256 of the input, lowercase hex.
    Fingerprint(String),
    /// Stable identifier chosen by the caller. Only sound when the input
    /// behind the name never changes.
    Named(String),
    /// The single well-known key of a whole-batch computation.
    Batch(String),
}

impl CacheKey {
    /// Fingerprint of an in-memory payload.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        CacheKey::Fingerprint(hex::encode(Sha256::digest(bytes)))
    }

    /// Fingerprint of a file's full content, read in chunks.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut file = tokio::fs::File::open(path).await.map_err(|e| Error::storage(path, e))?;

        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let n = file.read(&mut buf).await.map_err(|e| Error::storage(path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        Ok(CacheKey::Fingerprint(hex::encode(hasher.finalize())))
    }

    /// Fingerprint of an ordered list of inputs, e.g. model, prompt and payload.
    ///
    /// Each part is length-prefixed, so `["ab", "c"]` and `["a", "bc"]` hash
    /// differently.
    pub fn from_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        CacheKey::Fingerprint(hex::encode(hasher.finalize()))
    }

    /// Key for an input identified by a stable name.
    pub fn named(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        validate_segment(&id)?;
        Ok(CacheKey::Named(id))
    }

    /// Key for a whole-batch result.
    pub fn batch(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        validate_segment(&id)?;
        Ok(CacheKey::Batch(id))
    }

    /// Name of the file holding this entry inside a store directory.
    pub fn file_name(&self) -> String {
        match self {
            CacheKey::Fingerprint(hex) => format!("{hex}{FILE_EXT}"),
            CacheKey::Named(id) => format!("{NAMED_PREFIX}-{id}{FILE_EXT}"),
            CacheKey::Batch(id) => format!("{BATCH_PREFIX}-{id}{FILE_EXT}"),
        }
    }

    /// Inverse of [`CacheKey::file_name`]. Returns `None` for files the store
    /// did not write.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(FILE_EXT)?;
        if let Some(id) = stem.strip_prefix("name-") {
            return validate_segment(id).ok().map(|()| CacheKey::Named(id.to_string()));
        }
        if let Some(id) = stem.strip_prefix("batch-") {
            return validate_segment(id).ok().map(|()| CacheKey::Batch(id.to_string()));
        }
        is_sha256_hex(stem).then(|| CacheKey::Fingerprint(stem.to_string()))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Fingerprint(hex) => f.write_str(hex),
            CacheKey::Named(id) => write!(f, "{NAMED_PREFIX}:{id}"),
            CacheKey::Batch(id) => write!(f, "{BATCH_PREFIX}:{id}"),
        }
    }
}

impl Serialize for CacheKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for CacheKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((NAMED_PREFIX, id)) => CacheKey::named(id),
            Some((BATCH_PREFIX, id)) => CacheKey::batch(id),
            Some(_) => Err(Error::InvalidKey(format!("unknown key kind in {s:?}"))),
            None if is_sha256_hex(s) => Ok(CacheKey::Fingerprint(s.to_ascii_lowercase())),
            None => Err(Error::InvalidKey(format!(
                "{s:?} is neither a sha256 hex digest nor a name:/batch: key"
            ))),
        }
    }
}

/// Check that `segment` is safe to use as a single path component.
pub(crate) fn validate_segment(segment: &str) -> Result<(), Error> {
    if segment.is_empty() {
        return Err(Error::InvalidKey("identifier must not be empty".into()));
    }
    if segment.len() > MAX_SEGMENT_LEN {
        return Err(Error::InvalidKey(format!(
            "identifier longer than {MAX_SEGMENT_LEN} characters"
        )));
    }
    if segment.starts_with('.') {
        return Err(Error::InvalidKey(format!("{segment:?} must not start with '.'")));
    }
    if let Some(c) = segment
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(Error::InvalidKey(format!("{segment:?} contains {c:?}")));
    }
    Ok(())
}

fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn test_fingerprint_known_value() {
        let key = CacheKey::from_bytes(b"hello");
        assert_eq!(key, CacheKey::Fingerprint(HELLO_SHA256.to_string()));
        assert_eq!(key.to_string(), HELLO_SHA256);
    }

    #[test]
    fn test_fingerprint_stability() {
        assert_eq!(CacheKey::from_bytes(b"payload"), CacheKey::from_bytes(b"payload"));
    }

    #[test]
    fn test_fingerprint_distinct_inputs() {
        assert_ne!(CacheKey::from_bytes(b"a"), CacheKey::from_bytes(b"b"));
    }

    #[test]
    fn test_parts_are_length_prefixed() {
        let split_a = CacheKey::from_parts(&[b"ab".as_slice(), b"c".as_slice()]);
        let split_b = CacheKey::from_parts(&[b"a".as_slice(), b"bc".as_slice()]);
        assert_ne!(split_a, split_b);
        assert_ne!(CacheKey::from_parts(&[b"abc".as_slice()]), CacheKey::from_bytes(b"abc"));
    }

    #[test]
    fn test_parts_order_matters() {
        let forward = CacheKey::from_parts(&[b"gpt-4o".as_slice(), b"prompt".as_slice()]);
        let reversed = CacheKey::from_parts(&[b"prompt".as_slice(), b"gpt-4o".as_slice()]);
        assert_ne!(forward, reversed);
    }

    #[tokio::test]
    async fn test_from_file_matches_from_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        file.flush().unwrap();

        let key = CacheKey::from_file(file.path()).await.unwrap();
        assert_eq!(key.to_string(), HELLO_SHA256);
    }

    #[tokio::test]
    async fn test_from_file_spanning_chunks() {
        let content = vec![7u8; READ_CHUNK * 2 + 17];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&content).unwrap();
        file.flush().unwrap();

        let key = CacheKey::from_file(file.path()).await.unwrap();
        assert_eq!(key, CacheKey::from_bytes(&content));
    }

    #[tokio::test]
    async fn test_from_file_missing_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CacheKey::from_file(dir.path().join("missing.m4a")).await.unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
    }

    #[test]
    fn test_named_rejects_unsafe_ids() {
        for bad in ["", "../etc", "a/b", "a\\b", ".hidden", "with space", "colon:id"] {
            assert!(
                matches!(CacheKey::named(bad), Err(Error::InvalidKey(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(CacheKey::named("x".repeat(MAX_SEGMENT_LEN + 1)).is_err());
        assert!(CacheKey::named("x".repeat(MAX_SEGMENT_LEN)).is_ok());
    }

    #[test]
    fn test_named_accepts_file_like_ids() {
        let key = CacheKey::named("report_2024-11.txt").unwrap();
        assert_eq!(key.to_string(), "name:report_2024-11.txt");
        assert_eq!(key.file_name(), "name-report_2024-11.txt.json");
    }

    #[test]
    fn test_display_parse_inverse() {
        let keys = [
            CacheKey::from_bytes(b"hello"),
            CacheKey::named("facts.txt").unwrap(),
            CacheKey::batch("categories").unwrap(),
        ];
        for key in keys {
            let parsed: CacheKey = key.to_string().parse().unwrap();
            assert_eq!(parsed, key);
            assert_eq!(CacheKey::from_file_name(&key.file_name()), Some(key));
        }
    }

    #[test]
    fn test_parse_uppercase_hex_normalizes() {
        let parsed: CacheKey = HELLO_SHA256.to_ascii_uppercase().parse().unwrap();
        assert_eq!(parsed, CacheKey::from_bytes(b"hello"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-a-key".parse::<CacheKey>().is_err());
        assert!("other:id".parse::<CacheKey>().is_err());
        assert!("name:".parse::<CacheKey>().is_err());
    }

    #[test]
    fn test_named_and_batch_do_not_collide() {
        let named = CacheKey::named("run").unwrap();
        let batch = CacheKey::batch("run").unwrap();
        assert_ne!(named.file_name(), batch.file_name());
        assert_ne!(named.to_string(), batch.to_string());
    }

    #[test]
    fn test_from_file_name_ignores_foreign_files() {
        assert_eq!(CacheKey::from_file_name("notes.txt"), None);
        assert_eq!(CacheKey::from_file_name("transcription.pkl"), None);
        assert_eq!(CacheKey::from_file_name("abc.json"), None);
        assert_eq!(CacheKey::from_file_name("name-.json"), None);
    }
}
