//! Configuration Module
//!
//! Handles cache configuration, with defaults and environment overrides.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::Ttl;
use crate::error::{CacheError, Result};

/// Cache configuration parameters.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied when a write asks for `Ttl::Default`
    pub default_ttl: Ttl,
    /// Interval between background expiration sweeps
    pub sweep_interval: Duration,
    /// Snapshot file restored on start and written on shutdown by the binary
    pub snapshot_path: Option<PathBuf>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds, 0 or negative = never expire (default: never)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 1000)
    /// - `CACHE_SNAPSHOT_PATH` - Snapshot file path (default: none)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = parse_millis(&lookup, "CACHE_DEFAULT_TTL_MS")? {
            config.default_ttl = Ttl::from_millis(ms);
        }
        if let Some(ms) = parse_millis(&lookup, "CACHE_SWEEP_INTERVAL_MS")? {
            if ms <= 0 {
                return Err(CacheError::InvalidConfig(format!(
                    "CACHE_SWEEP_INTERVAL_MS must be positive, got {}",
                    ms
                )));
            }
            config.sweep_interval = Duration::from_millis(ms.unsigned_abs());
        }
        config.snapshot_path = lookup("CACHE_SNAPSHOT_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    // == Builders ==
    /// Sets the TTL used for `Ttl::Default` writes.
    pub fn with_default_ttl(mut self, ttl: Ttl) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the interval between expiration sweeps.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the snapshot file used by the binary.
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Ttl::Never,
            sweep_interval: Duration::from_secs(1),
            snapshot_path: None,
        }
    }
}

fn parse_millis<F>(lookup: &F, name: &str) -> Result<Option<i64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| {
            raw.trim().parse::<i64>().map_err(|_| {
                CacheError::InvalidConfig(format!(
                    "{} must be an integer number of milliseconds, got {:?}",
                    name, raw
                ))
            })
        })
        .transpose()
}
