//! Snapcache - An in-process key-value cache
//!
//! Provides per-entry TTL expiration, a background expiration sweeper and
//! snapshot persistence to any byte sink or source.

pub mod cache;
pub mod config;
pub mod error;
pub mod snapshot;
pub mod tasks;

pub use cache::{Cache, CacheStats, Entry, EntryStore, Ttl};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use snapshot::{JsonCodec, SnapshotCodec};
pub use tasks::Sweeper;
