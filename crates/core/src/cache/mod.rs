//! File-backed cache for results of expensive external calls.
//!
//! It supports:
//!
//! - Content-addressed keys using SHA-256 hashing
//! - One human-readable JSON file per entry, deletable by hand
//! - Namespaces as subdirectories
//! - A separately named whole-batch mode

pub mod batch;
pub mod entry;
pub mod key;
pub mod result_cache;
pub mod store;

pub use crate::Error;

pub use batch::BatchCache;
pub use entry::{CacheEntry, EntryInfo, StoreStats};
pub use key::CacheKey;
pub use result_cache::{CacheCounters, ResultCache};
pub use store::DirStore;
