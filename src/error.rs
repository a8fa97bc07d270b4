//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::io;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A live entry already occupies the key
    #[error("Item {0} already exists")]
    AlreadyExists(String),

    /// No live entry occupies the key
    #[error("Item {0} not found")]
    NotFound(String),

    /// The codec could not serialize the stored entries
    #[error("Failed to encode snapshot: {0}")]
    Encode(String),

    /// The snapshot stream is malformed or was written by another codec
    #[error("Failed to decode snapshot: {0}")]
    Decode(String),

    /// Snapshot sink or source failure, passed through unchanged
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The sweeper needs a Tokio runtime to be spawned on
    #[error("No Tokio runtime available to spawn the expiration sweeper")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_identify_key() {
        let err = CacheError::AlreadyExists("session:42".to_string());
        assert!(err.to_string().contains("session:42"));

        let err = CacheError::NotFound("session:7".to_string());
        assert!(err.to_string().contains("session:7"));
    }

    #[test]
    fn test_io_error_passes_through() {
        let err: CacheError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        match err {
            CacheError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::PermissionDenied);
                assert_eq!(inner.to_string(), "denied");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
