//! Cache Handle Module
//!
//! Ties one entry store, one expiration sweeper and one snapshot codec
//! together.

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::cache::{CacheStats, EntryStore, Ttl};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::snapshot::{JsonCodec, SnapshotCodec};
use crate::tasks::Sweeper;

// == Cache ==
/// In-process key-value cache with TTL expiration and snapshot persistence.
///
/// Construction spawns exactly one background sweeper on the current Tokio
/// runtime. All operations are synchronous and can be called from plain
/// threads as well as async tasks. Share a cache between threads with `Arc`.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use snapcache::{Cache, CacheConfig, Ttl};
///
/// #[tokio::main]
/// async fn main() -> snapcache::Result<()> {
///     let config = CacheConfig::default().with_sweep_interval(Duration::from_millis(50));
///     let cache: Cache<u32> = Cache::new(&config)?;
///
///     cache.set("a", 1, Ttl::After(Duration::from_millis(20)));
///     assert_eq!(cache.get("a"), Some(1));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Cache<V, C = JsonCodec> {
    store: Arc<EntryStore<V>>,
    sweeper: Sweeper,
    codec: C,
}

impl<V> Cache<V, JsonCodec>
where
    V: Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache that snapshots as JSON.
    ///
    /// # Errors
    /// - `InvalidConfig` if the sweep interval is zero
    /// - `NoRuntime` if called outside a Tokio runtime
    pub fn new(config: &CacheConfig) -> Result<Self> {
        Self::with_codec(config, JsonCodec::new())
    }
}

impl<V, C> Cache<V, C>
where
    V: Send + Sync + 'static,
    C: SnapshotCodec,
{
    /// Creates a cache that snapshots with `codec`.
    pub fn with_codec(config: &CacheConfig, codec: C) -> Result<Self> {
        let store = Arc::new(EntryStore::new(config.default_ttl));
        let sweeper = Sweeper::spawn(Arc::downgrade(&store), config.sweep_interval)?;

        info!(
            "Cache created: default_ttl={:?}, sweep_interval={:?}",
            config.default_ttl, config.sweep_interval
        );
        Ok(Self {
            store,
            sweeper,
            codec,
        })
    }
}

impl<V, C> Cache<V, C> {
    // == Store ==
    /// Returns the underlying entry store.
    pub fn store(&self) -> &EntryStore<V> {
        &self.store
    }

    // == Codec ==
    /// Returns the snapshot codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    // == Set ==
    /// Stores a value, overwriting any existing entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Ttl) {
        self.store.set(key, value, ttl);
    }

    // == Add ==
    /// Stores a value only if no live entry occupies `key`.
    ///
    /// # Errors
    /// - `AlreadyExists` if a live entry holds the key
    pub fn add(&self, key: impl Into<String>, value: V, ttl: Ttl) -> Result<()> {
        self.store.add(key, value, ttl)
    }

    // == Replace ==
    /// Stores a value only if a live entry already occupies `key`.
    ///
    /// # Errors
    /// - `NotFound` if the key is absent or expired
    pub fn replace(&self, key: impl Into<String>, value: V, ttl: Ttl) -> Result<()> {
        self.store.replace(key, value, ttl)
    }

    // == Delete ==
    /// Removes an entry by key. Missing keys are ignored.
    pub fn delete(&self, key: &str) {
        self.store.delete(key);
    }

    // == Delete Expired ==
    /// Removes expired entries now instead of waiting for the sweeper.
    ///
    /// Returns the number of entries removed.
    pub fn delete_expired(&self) -> usize {
        self.store.delete_expired()
    }

    // == Count ==
    /// Returns the number of stored entries, expired ones included.
    pub fn count(&self) -> usize {
        self.store.count()
    }

    // == Flush ==
    /// Removes every entry.
    pub fn flush(&self) {
        self.store.flush();
        info!("Cache flushed");
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    // == TTL Remaining ==
    /// Returns the time left on a live entry.
    ///
    /// `None` if the key is absent or expired, `Some(None)` if it never expires.
    pub fn ttl_remaining(&self, key: &str) -> Option<Option<Duration>> {
        self.store.ttl_remaining(key)
    }

    // == Sweeper Control ==
    /// Stops the background sweeper. Safe to call more than once.
    ///
    /// Reads and writes keep working; expired entries then stay stored until
    /// `delete_expired` is called.
    pub fn stop_sweeper(&self) {
        self.sweeper.stop();
    }

    /// Returns true until the background sweeper has exited.
    pub fn is_sweeper_running(&self) -> bool {
        self.sweeper.is_running()
    }
}

impl<V: Clone, C> Cache<V, C> {
    // == Get ==
    /// Retrieves a live value by key.
    pub fn get(&self, key: &str) -> Option<V> {
        self.store.get(key)
    }

    // == Get With Expiration ==
    /// Retrieves a live value together with its expiration instant.
    pub fn get_with_expiration(&self, key: &str) -> Option<(V, Option<SystemTime>)> {
        self.store.get_with_expiration(key)
    }
}

impl<V: Serialize, C: SnapshotCodec> Cache<V, C> {
    // == Save ==
    /// Writes a snapshot of every entry to `sink`.
    ///
    /// Returns the number of entries written.
    pub fn save<W: Write>(&self, sink: W) -> Result<usize> {
        self.store.save(&self.codec, sink)
    }

    // == Save To File ==
    /// Writes a snapshot to the file at `path`, creating or truncating it.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        self.store.save_to_file(&self.codec, path)
    }
}

impl<V: DeserializeOwned, C: SnapshotCodec> Cache<V, C> {
    // == Load ==
    /// Merges a snapshot from `source`; live entries are kept.
    ///
    /// Returns the number of entries installed.
    pub fn load<R: Read>(&self, source: R) -> Result<usize> {
        self.store.load(&self.codec, source)
    }

    // == Load From File ==
    /// Merges a snapshot read from the file at `path`.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        self.store.load_from_file(&self.codec, path)
    }
}
