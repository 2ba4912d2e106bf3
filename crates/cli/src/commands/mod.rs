//! Operator commands.
//!
//! Each command takes a [`DirStore`](stash_core::DirStore) and its parameters
//! and returns a serializable output that `main` prints as JSON.

pub mod fingerprint;
pub mod list;
pub mod purge;
pub mod show;

pub use fingerprint::{FingerprintParams, fingerprint_impl};
pub use list::{list_impl, stats_impl};
pub use purge::{PurgeParams, purge_impl};
pub use show::{ShowParams, show_impl};
