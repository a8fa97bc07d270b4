//! Snapcache - snapshot-backed cache host
//!
//! Runs a cache of JSON values for the lifetime of the process, restoring it
//! from a snapshot file on start and writing it back on shutdown.

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapcache::{Cache, CacheConfig};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and its expiration sweeper
/// 4. Restore the snapshot file, if one is configured and present
/// 5. Wait for SIGINT/SIGTERM, then save the snapshot and stop the sweeper
#[tokio::main]
async fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting snapcache");

    let config = CacheConfig::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: default_ttl={:?}, sweep_interval={:?}, snapshot_path={:?}",
        config.default_ttl, config.sweep_interval, config.snapshot_path
    );

    let cache: Cache<serde_json::Value> =
        Cache::new(&config).context("Failed to create cache")?;

    if let Some(path) = &config.snapshot_path {
        if path.exists() {
            let restored = cache
                .load_from_file(path)
                .with_context(|| format!("Failed to restore snapshot {}", path.display()))?;
            info!("Restored {} entries from {}", restored, path.display());
        } else {
            info!("No snapshot at {}, starting empty", path.display());
        }
    }

    shutdown_signal().await?;

    match &config.snapshot_path {
        Some(path) => {
            let saved = cache
                .save_to_file(path)
                .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
            info!("Saved {} entries to {}", saved, path.display());
        }
        None => warn!("No snapshot path configured, cache contents discarded"),
    }

    cache.stop_sweeper();
    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl+C")?;
                info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
        info!("Received Ctrl+C, initiating shutdown...");
    }

    Ok(())
}
