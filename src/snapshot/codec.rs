//! Snapshot Codecs
//!
//! Pluggable encode/decode of snapshot envelopes.

use std::io::{self, Read};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::{Snapshot, SnapshotRef};

// == Codec Error ==
/// Failure reported by a codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The underlying byte source failed
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The data could not be represented or parsed
    #[error("{0}")]
    Format(String),
}

// == Snapshot Codec ==
/// Turns snapshots into bytes and back.
///
/// Value types are constrained by serde bounds, so only serializable payloads
/// can be saved and only deserializable ones loaded.
pub trait SnapshotCodec: Send + Sync {
    /// Encodes a borrowed snapshot into a byte buffer.
    fn encode<V: Serialize>(&self, snapshot: &SnapshotRef<'_, V>) -> Result<Vec<u8>, CodecError>;

    /// Decodes a full snapshot from `source`.
    fn decode<V: DeserializeOwned>(&self, source: &mut dyn Read) -> Result<Snapshot<V>, CodecError>;
}

// == JSON Codec ==
/// Snapshot codec backed by serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Creates a compact JSON codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec that writes indented JSON.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl SnapshotCodec for JsonCodec {
    fn encode<V: Serialize>(&self, snapshot: &SnapshotRef<'_, V>) -> Result<Vec<u8>, CodecError> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(snapshot)
        } else {
            serde_json::to_vec(snapshot)
        };
        encoded.map_err(json_error)
    }

    fn decode<V: DeserializeOwned>(&self, source: &mut dyn Read) -> Result<Snapshot<V>, CodecError> {
        serde_json::from_reader(source).map_err(json_error)
    }
}

fn json_error(err: serde_json::Error) -> CodecError {
    if err.is_io() {
        CodecError::Io(err.into())
    } else {
        CodecError::Format(err.to_string())
    }
}
