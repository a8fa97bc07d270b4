//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A stored value plus its absolute expiration timestamp.
///
/// `expires_at_nanos` counts nanoseconds since the UNIX epoch. Zero means the
/// entry never expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<V> {
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix nanoseconds), 0 = no expiration
    pub expires_at_nanos: u64,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    ///
    /// A zero `ttl` stores the entry forever.
    pub fn new(value: V, ttl: Duration) -> Self {
        let expires_at_nanos = if ttl.is_zero() {
            0
        } else {
            current_timestamp_nanos().saturating_add(duration_nanos(ttl))
        };

        Self {
            value,
            expires_at_nanos,
        }
    }

    /// Creates an entry that never expires.
    pub fn persistent(value: V) -> Self {
        Self {
            value,
            expires_at_nanos: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired against the current clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_nanos())
    }

    /// Checks if the entry has expired at `now_nanos`.
    ///
    /// An entry with a timestamp is expired only once `now_nanos` is strictly
    /// past it. Entries without a timestamp never expire.
    pub fn is_expired_at(&self, now_nanos: u64) -> bool {
        self.expires_at_nanos > 0 && now_nanos > self.expires_at_nanos
    }

    /// Returns the expiration instant, or None if the entry never expires.
    pub fn expires_at(&self) -> Option<SystemTime> {
        (self.expires_at_nanos > 0)
            .then(|| UNIX_EPOCH + Duration::from_nanos(self.expires_at_nanos))
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has a TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        if self.expires_at_nanos == 0 {
            return None;
        }
        let now = current_timestamp_nanos();
        Some(Duration::from_nanos(
            self.expires_at_nanos.saturating_sub(now),
        ))
    }
}

// == Utility Functions ==
/// Returns the current Unix timestamp in nanoseconds.
///
/// A clock set before the epoch reads as 0.
pub fn current_timestamp_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_nanos)
        .unwrap_or(0)
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
