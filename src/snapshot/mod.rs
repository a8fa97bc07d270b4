//! Snapshot Module
//!
//! Serializes the whole entry map to a byte sink and merges it back from a
//! byte source.
//!
//! # Format
//! A snapshot is an envelope holding a format version, the time it was taken,
//! and every stored entry with its absolute expiration timestamp. Timestamps
//! are UNIX-epoch nanoseconds and are restored as-is, so entries that expired
//! while the snapshot sat on disk come back expired.

mod codec;
mod persist;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Entry;

pub use codec::{CodecError, JsonCodec, SnapshotCodec};

/// Envelope version written by this crate
pub const SNAPSHOT_VERSION: u32 = 1;

// == Snapshot Ref ==
/// Borrowed snapshot handed to a codec while the store is read-locked.
#[derive(Debug, Serialize)]
pub struct SnapshotRef<'a, V> {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub entries: &'a HashMap<String, Entry<V>>,
}

// == Snapshot ==
/// Owned snapshot produced by a codec on load.
#[derive(Debug, Deserialize)]
pub struct Snapshot<V> {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub entries: HashMap<String, Entry<V>>,
}
