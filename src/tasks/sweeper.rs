//! Expiration Sweeper
//!
//! Background task that periodically removes expired cache entries.
//!
//! The task wakes on a fixed interval and runs one full purge per tick. Ticks
//! that fall behind are delayed rather than bursted, so purges never overlap.
//! It stops when told to, when its handle is dropped, or when the store it
//! sweeps is gone.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::EntryStore;
use crate::error::{CacheError, Result};

// == Sweeper ==
/// Handle to a running expiration sweeper.
///
/// Stopping is idempotent: `stop` can be called any number of times, before
/// or after the task has exited.
#[derive(Debug)]
pub struct Sweeper {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawns a sweeper for `store` on the current Tokio runtime.
    ///
    /// The sweeper only holds a weak reference, so it never keeps the store
    /// alive on its own.
    ///
    /// # Errors
    /// - `InvalidConfig` if `interval` is zero
    /// - `NoRuntime` if called outside a Tokio runtime
    pub fn spawn<V>(store: Weak<EntryStore<V>>, interval: Duration) -> Result<Self>
    where
        V: Send + Sync + 'static,
    {
        if interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be greater than zero".to_string(),
            ));
        }
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = runtime.spawn(sweep_loop(store, interval, stop_rx));

        Ok(Self { stop_tx, handle })
    }

    /// Signals the sweeper to stop.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Returns true until the task has exited.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sweep_loop<V>(
    store: Weak<EntryStore<V>>,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
) where
    V: Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    info!("Starting expiration sweeper with interval of {:?}", interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(live) = store.upgrade() else {
                    debug!("Cache dropped, sweeper exiting");
                    break;
                };

                let removed = live.delete_expired();
                if removed > 0 {
                    info!("Expiration sweep: removed {} expired entries", removed);
                } else {
                    debug!("Expiration sweep: no expired entries found");
                }
            }
            changed = stop_rx.changed() => {
                // A dropped sender means the handle is gone
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }

    info!("Expiration sweeper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Ttl;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        let store = Arc::new(EntryStore::new(Ttl::Never));
        store.set("expire_soon", 1u32, Ttl::After(Duration::from_millis(10)));

        let sweeper = Sweeper::spawn(Arc::downgrade(&store), Duration::from_millis(25)).unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(store.count(), 0, "Expired entry should have been swept");
        sweeper.stop();
    }

    #[tokio::test]
    async fn test_sweeper_preserves_valid_entries() {
        let store = Arc::new(EntryStore::new(Ttl::Never));
        store.set("long_lived", 1u32, Ttl::After(Duration::from_secs(3600)));
        store.set("forever", 2u32, Ttl::Never);

        let sweeper = Sweeper::spawn(Arc::downgrade(&store), Duration::from_millis(20)).unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(store.count(), 2);
        assert_eq!(store.get("long_lived"), Some(1));
        sweeper.stop();
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let store = Arc::new(EntryStore::<u32>::new(Ttl::Never));
        let sweeper = Sweeper::spawn(Arc::downgrade(&store), Duration::from_millis(10)).unwrap();

        sweeper.stop();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!sweeper.is_running(), "Sweeper should exit after stop");

        // Stopping an exited sweeper neither blocks nor panics
        sweeper.stop();
        sweeper.stop();
    }

    #[tokio::test]
    async fn test_sweeper_exits_when_store_dropped() {
        let store = Arc::new(EntryStore::<u32>::new(Ttl::Never));
        let sweeper = Sweeper::spawn(Arc::downgrade(&store), Duration::from_millis(10)).unwrap();

        drop(store);
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(!sweeper.is_running());
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_task() {
        let store = Arc::new(EntryStore::<u32>::new(Ttl::Never));
        let sweeper = Sweeper::spawn(Arc::downgrade(&store), Duration::from_millis(10)).unwrap();
        let task = sweeper.handle.abort_handle();

        drop(sweeper);
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The store is still alive, so only the drop could have ended the task
        assert!(task.is_finished());
        assert_eq!(Arc::strong_count(&store), 1);
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let store = Arc::new(EntryStore::<u32>::new(Ttl::Never));
        let result = Sweeper::spawn(Arc::downgrade(&store), Duration::ZERO);
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_spawn_outside_runtime_fails() {
        let store = Arc::new(EntryStore::<u32>::new(Ttl::Never));
        let result = Sweeper::spawn(Arc::downgrade(&store), Duration::from_secs(1));
        assert!(matches!(result, Err(CacheError::NoRuntime)));
    }
}
