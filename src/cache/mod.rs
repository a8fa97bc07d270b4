//! Cache Module
//!
//! Provides in-memory caching with per-entry TTL expiration.

mod entry;
mod handle;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub use entry::{current_timestamp_nanos, Entry};
pub use handle::Cache;
pub use stats::CacheStats;
pub use store::EntryStore;
pub use ttl::Ttl;
