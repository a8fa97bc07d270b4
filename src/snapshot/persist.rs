//! Snapshot save/load over an EntryStore.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::{CodecError, Snapshot, SnapshotCodec, SnapshotRef, SNAPSHOT_VERSION};
use crate::cache::{current_timestamp_nanos, EntryStore};
use crate::error::{CacheError, Result};

impl<V: Serialize> EntryStore<V> {
    // == Save ==
    /// Writes every stored entry to `sink` and returns how many were written.
    ///
    /// Encoding happens under the read lock, so the snapshot is a single
    /// point in time and writers wait until it is done. The sink is written
    /// after the lock is released; an encode failure writes nothing.
    pub fn save<C, W>(&self, codec: &C, mut sink: W) -> Result<usize>
    where
        C: SnapshotCodec,
        W: Write,
    {
        let (bytes, count) = {
            let entries = self.entries.read();
            let snapshot = SnapshotRef {
                version: SNAPSHOT_VERSION,
                saved_at: Utc::now(),
                entries: &*entries,
            };
            let bytes = codec.encode(&snapshot).map_err(|err| match err {
                CodecError::Io(err) => CacheError::Io(err),
                CodecError::Format(msg) => CacheError::Encode(msg),
            })?;
            (bytes, entries.len())
        };

        sink.write_all(&bytes)?;
        sink.flush()?;

        info!("Snapshot saved: {} entries, {} bytes", count, bytes.len());
        Ok(count)
    }

    /// Saves a snapshot to `path`, creating or truncating the file.
    pub fn save_to_file<C, P>(&self, codec: &C, path: P) -> Result<usize>
    where
        C: SnapshotCodec,
        P: AsRef<Path>,
    {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        let count = self.save(codec, &mut writer)?;

        let file = writer.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()?;
        Ok(count)
    }
}

impl<V: DeserializeOwned> EntryStore<V> {
    // == Load ==
    /// Merges a snapshot from `source` and returns how many entries were installed.
    ///
    /// The whole snapshot is decoded before the store is touched. A snapshot
    /// entry is installed only where the store has no entry for its key or
    /// only an expired one; live entries always win.
    pub fn load<C, R>(&self, codec: &C, mut source: R) -> Result<usize>
    where
        C: SnapshotCodec,
        R: Read,
    {
        let snapshot: Snapshot<V> = codec.decode(&mut source).map_err(|err| match err {
            CodecError::Io(err) => CacheError::Io(err),
            CodecError::Format(msg) => CacheError::Decode(msg),
        })?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CacheError::Decode(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }
        debug!(
            "Decoded snapshot taken at {} with {} entries",
            snapshot.saved_at,
            snapshot.entries.len()
        );

        let total = snapshot.entries.len();
        let now = current_timestamp_nanos();
        let mut installed = 0;
        {
            let mut entries = self.entries.write();
            for (key, entry) in snapshot.entries {
                let live = entries
                    .get(&key)
                    .is_some_and(|current| !current.is_expired_at(now));
                if !live {
                    entries.insert(key, entry);
                    installed += 1;
                }
            }
        }

        info!(
            "Snapshot loaded: {} of {} entries installed",
            installed, total
        );
        Ok(installed)
    }

    /// Loads a snapshot from the file at `path`.
    pub fn load_from_file<C, P>(&self, codec: &C, path: P) -> Result<usize>
    where
        C: SnapshotCodec,
        P: AsRef<Path>,
    {
        let file = File::open(path.as_ref())?;
        self.load(codec, BufReader::new(file))
    }
}
