//! Snapshot codec for [`MetaProgressionState`].
//!
//! Snapshots are a four-byte magic, a little-endian format version and the
//! bincode payload. The codec is pure so both repositories share it and tests
//! can exercise it without touching the filesystem.

use demonbane_core::MetaProgressionState;

use super::error::{RepositoryError, Result};

const MAGIC: [u8; 4] = *b"DMBN";
const VERSION: u16 = 1;
const HEADER_LEN: usize = MAGIC.len() + 2;

/// Serializes a meta state into a versioned snapshot.
pub fn encode(state: &MetaProgressionState) -> Result<Vec<u8>> {
    let payload =
        bincode::serialize(state).map_err(|e| RepositoryError::Serialization(e.to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Parses a snapshot produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<MetaProgressionState> {
    if bytes.len() < HEADER_LEN || bytes[..MAGIC.len()] != MAGIC {
        return Err(RepositoryError::CorruptedData(
            "missing meta snapshot header".into(),
        ));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(RepositoryError::CorruptedData(format!(
            "unsupported snapshot version {version}"
        )));
    }

    bincode::deserialize(&bytes[HEADER_LEN..])
        .map_err(|e| RepositoryError::Serialization(e.to_string()))
}
