//! TTL Module
//!
//! Encodes how long an entry should live when it is written.

use std::time::Duration;

// == Ttl ==
/// Lifetime requested for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Use the cache's configured default TTL
    #[default]
    Default,
    /// Never expire
    Never,
    /// Expire after the given duration; `Duration::ZERO` stores forever
    After(Duration),
}

impl Ttl {
    /// Resolves `Ttl::Default` against the cache-wide default.
    ///
    /// Returns the lifetime to apply, where `Duration::ZERO` means no
    /// expiration. A default that is itself `Ttl::Default` never expires.
    pub fn resolve(self, default: Ttl) -> Duration {
        let effective = match self {
            Ttl::Default => default,
            other => other,
        };
        match effective {
            Ttl::After(d) => d,
            Ttl::Default | Ttl::Never => Duration::ZERO,
        }
    }

    /// Builds a TTL from signed milliseconds; zero or negative never expires.
    pub fn from_millis(ms: i64) -> Self {
        match u64::try_from(ms) {
            Ok(ms) if ms > 0 => Ttl::After(Duration::from_millis(ms)),
            _ => Ttl::Never,
        }
    }
}

impl From<Duration> for Ttl {
    fn from(d: Duration) -> Self {
        Ttl::After(d)
    }
}
