//! Core types and shared functionality for stash.
//!
//! This crate provides:
//! - Content-addressed result cache backed by one JSON file per key
//! - Unified error types
//! - Configuration and secret loading

pub mod cache;
pub mod config;
pub mod error;
pub mod secrets;

pub use cache::{BatchCache, CacheCounters, CacheEntry, CacheKey, DirStore, EntryInfo, ResultCache, StoreStats};
pub use config::{CacheConfig, ConfigError};
pub use error::Error;
pub use secrets::Secrets;
