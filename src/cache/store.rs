//! Cache Store Module
//!
//! Main cache engine: a HashMap of entries behind a single reader-writer lock,
//! with lazy expiration on read and eager removal on sweep.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use parking_lot::RwLock;
use tracing::debug;

use crate::cache::entry::{current_timestamp_nanos, Entry};
use crate::cache::stats::StatsCounters;
use crate::cache::{CacheStats, Ttl};
use crate::error::{CacheError, Result};

// == Entry Store ==
/// Thread-safe storage of entries with expiration-aware reads.
///
/// Readers (`get`, `count`, `stats`) share the lock. Every mutation, and the
/// existence check of `add`/`replace`, runs under the exclusive lock.
#[derive(Debug)]
pub struct EntryStore<V> {
    /// Key-value storage
    pub(crate) entries: RwLock<HashMap<String, Entry<V>>>,
    /// TTL applied for `Ttl::Default`
    default_ttl: Ttl,
    /// Read and sweep counters
    stats: StatsCounters,
}

impl<V> EntryStore<V> {
    // == Constructor ==
    /// Creates an empty store with the given default TTL.
    pub fn new(default_ttl: Ttl) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            stats: StatsCounters::default(),
        }
    }

    /// Returns the TTL substituted for `Ttl::Default`.
    pub fn default_ttl(&self) -> Ttl {
        self.default_ttl
    }

    fn make_entry(&self, value: V, ttl: Ttl) -> Entry<V> {
        Entry::new(value, ttl.resolve(self.default_ttl))
    }

    // == Set ==
    /// Stores a value, overwriting any existing entry for `key`.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Ttl) {
        let entry = self.make_entry(value, ttl);
        self.entries.write().insert(key.into(), entry);
    }

    // == Add ==
    /// Stores a value only if no live entry occupies `key`.
    ///
    /// An expired entry that has not been swept yet counts as absent.
    pub fn add(&self, key: impl Into<String>, value: V, ttl: Ttl) -> Result<()> {
        let key = key.into();
        let mut entries = self.entries.write();
        if live_entry(&entries, &key, current_timestamp_nanos()).is_some() {
            return Err(CacheError::AlreadyExists(key));
        }
        let entry = self.make_entry(value, ttl);
        entries.insert(key, entry);
        Ok(())
    }

    // == Replace ==
    /// Stores a value only if a live entry already occupies `key`.
    pub fn replace(&self, key: impl Into<String>, value: V, ttl: Ttl) -> Result<()> {
        let key = key.into();
        let mut entries = self.entries.write();
        if live_entry(&entries, &key, current_timestamp_nanos()).is_none() {
            return Err(CacheError::NotFound(key));
        }
        let entry = self.make_entry(value, ttl);
        entries.insert(key, entry);
        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key. Missing keys are ignored.
    pub fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }

    // == Delete Expired ==
    /// Removes every expired entry and returns how many were removed.
    ///
    /// Expiry is judged against one timestamp taken before the scan starts.
    pub fn delete_expired(&self) -> usize {
        let now = current_timestamp_nanos();
        let removed = {
            let mut entries = self.entries.write();
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired_at(now));
            before - entries.len()
        };

        self.stats.record_evictions(removed);
        removed
    }

    // == Count ==
    /// Returns the number of stored entries, expired-but-unswept included.
    pub fn count(&self) -> usize {
        self.entries.read().len()
    }

    // == Flush ==
    /// Drops every entry.
    pub fn flush(&self) {
        let old = std::mem::take(&mut *self.entries.write());
        debug!("Flushed {} entries", old.len());
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.count())
    }

    /// Returns the remaining lifetime of a live entry.
    ///
    /// `Some(None)` means the entry lives forever.
    pub fn ttl_remaining(&self, key: &str) -> Option<Option<Duration>> {
        let entries = self.entries.read();
        live_entry(&entries, key, current_timestamp_nanos()).map(Entry::ttl_remaining)
    }
}

impl<V: Clone> EntryStore<V> {
    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// Expired entries are reported as missing but left in place for the
    /// sweeper, so reads never take the write lock.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_with_expiration(key).map(|(value, _)| value)
    }

    /// Retrieves a live value together with its expiration instant.
    pub fn get_with_expiration(&self, key: &str) -> Option<(V, Option<SystemTime>)> {
        let found = {
            let entries = self.entries.read();
            live_entry(&entries, key, current_timestamp_nanos())
                .map(|entry| (entry.value.clone(), entry.expires_at()))
        };

        match found {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        found
    }
}

/// Looks up `key` on an already-locked map, hiding expired entries.
pub(crate) fn live_entry<'a, V>(
    entries: &'a HashMap<String, Entry<V>>,
    key: &str,
    now_nanos: u64,
) -> Option<&'a Entry<V>> {
    entries
        .get(key)
        .filter(|entry| !entry.is_expired_at(now_nanos))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn short() -> Ttl {
        Ttl::After(Duration::from_millis(20))
    }

    #[test]
    fn test_store_new() {
        let store: EntryStore<String> = EntryStore::new(Ttl::Never);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_store_set_and_get() {
        let store = EntryStore::new(Ttl::Never);

        store.set("key1", "value1".to_string(), Ttl::Default);

        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store: EntryStore<u32> = EntryStore::new(Ttl::Never);
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_overwrite() {
        let store = EntryStore::new(Ttl::Never);

        store.set("key1", 1, Ttl::Default);
        store.set("key1", 2, Ttl::Default);

        assert_eq!(store.get("key1"), Some(2));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_store_delete() {
        let store = EntryStore::new(Ttl::Never);

        store.set("key1", 1, Ttl::Default);
        store.delete("key1");
        store.delete("never_there");

        assert_eq!(store.count(), 0);
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_ttl_expiration_is_lazy() {
        let store = EntryStore::new(Ttl::Never);

        store.set("key1", 1, short());
        assert_eq!(store.get("key1"), Some(1));

        sleep(Duration::from_millis(40));

        // Hidden from reads but still stored until a sweep
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_store_default_ttl_applies() {
        let store = EntryStore::new(short());

        store.set("defaulted", 1, Ttl::Default);
        store.set("forever", 2, Ttl::Never);
        store.set("zero", 3, Ttl::After(Duration::ZERO));

        sleep(Duration::from_millis(40));

        assert_eq!(store.get("defaulted"), None);
        assert_eq!(store.get("forever"), Some(2));
        assert_eq!(store.get("zero"), Some(3));
    }

    #[test]
    fn test_store_add() {
        let store = EntryStore::new(Ttl::Never);

        store.add("key1", 1, Ttl::Default).unwrap();
        let result = store.add("key1", 2, Ttl::Default);

        assert!(matches!(result, Err(CacheError::AlreadyExists(ref k)) if k == "key1"));
        assert_eq!(store.get("key1"), Some(1));
    }

    #[test]
    fn test_store_add_over_expired_entry() {
        let store = EntryStore::new(Ttl::Never);

        store.set("key1", 1, short());
        sleep(Duration::from_millis(40));

        store.add("key1", 2, Ttl::Default).unwrap();
        assert_eq!(store.get("key1"), Some(2));
    }

    #[test]
    fn test_store_replace() {
        let store = EntryStore::new(Ttl::Never);

        let result = store.replace("key1", 1, Ttl::Default);
        assert!(matches!(result, Err(CacheError::NotFound(ref k)) if k == "key1"));
        assert_eq!(store.count(), 0);

        store.set("key1", 1, Ttl::Default);
        store.replace("key1", 2, Ttl::Default).unwrap();
        assert_eq!(store.get("key1"), Some(2));
    }

    #[test]
    fn test_store_replace_expired_fails() {
        let store = EntryStore::new(Ttl::Never);

        store.set("key1", 1, short());
        sleep(Duration::from_millis(40));

        let result = store.replace("key1", 2, Ttl::Default);
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_delete_expired() {
        let store = EntryStore::new(Ttl::Never);

        store.set("key1", 1, short());
        store.set("key2", 2, Ttl::After(Duration::from_secs(60)));
        store.set("key3", 3, Ttl::Never);

        sleep(Duration::from_millis(40));

        assert_eq!(store.delete_expired(), 1);
        assert_eq!(store.count(), 2);
        assert_eq!(store.get("key2"), Some(2));
        assert_eq!(store.get("key3"), Some(3));
        assert_eq!(store.stats().expired_evictions, 1);
    }

    #[test]
    fn test_store_flush() {
        let store = EntryStore::new(Ttl::Never);

        store.set("key1", 1, Ttl::Default);
        store.set("key2", 2, Ttl::Default);
        store.flush();

        assert_eq!(store.count(), 0);
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.get("key2"), None);
    }

    #[test]
    fn test_store_stats() {
        let store = EntryStore::new(Ttl::Never);

        store.set("key1", 1, Ttl::Default);
        store.get("key1"); // hit
        store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_get_with_expiration() {
        let store = EntryStore::new(Ttl::Never);

        store.set("forever", 1, Ttl::Never);
        store.set("timed", 2, Ttl::After(Duration::from_secs(60)));

        let (value, expires) = store.get_with_expiration("forever").unwrap();
        assert_eq!(value, 1);
        assert!(expires.is_none());

        let (value, expires) = store.get_with_expiration("timed").unwrap();
        assert_eq!(value, 2);
        assert!(expires.unwrap() > SystemTime::now());
    }

    #[test]
    fn test_store_ttl_remaining() {
        let store = EntryStore::new(Ttl::Never);

        store.set("forever", 1, Ttl::Never);
        store.set("timed", 2, Ttl::After(Duration::from_secs(60)));

        assert_eq!(store.ttl_remaining("forever"), Some(None));
        assert!(store.ttl_remaining("timed").flatten().unwrap() > Duration::from_secs(59));
        assert_eq!(store.ttl_remaining("missing"), None);
    }
}
