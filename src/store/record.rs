//! Checksummed document records
//!
//! Every row written to a collection file is wrapped in a record carrying a
//! CRC32 checksum over the canonical JSON bytes of its payload. Reads verify
//! the checksum before the payload is handed to anyone; a mismatch is a
//! corruption error, never silently skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{StoreError, StoreResult};

/// A single on-disk document record: checksum plus payload.
///
/// Serialized as one JSON object per line inside a collection file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Checksum over the canonical payload bytes, formatted `crc32:XXXXXXXX`
    pub checksum: String,
    /// The document payload
    pub payload: Value,
}

impl DocumentRecord {
    /// Wrap a payload, computing its checksum.
    pub fn new(payload: Value) -> StoreResult<Self> {
        let checksum = compute_payload_checksum(&payload)?;
        Ok(Self { checksum, payload })
    }

    /// Verify the stored checksum against the payload.
    pub fn verify(&self) -> StoreResult<bool> {
        let actual = compute_payload_checksum(&self.payload)?;
        Ok(actual == self.checksum)
    }

    /// Consume the record, returning the payload.
    pub fn into_payload(self) -> Value {
        self.payload
    }
}

/// Compute the `crc32:XXXXXXXX` checksum of a payload's canonical JSON bytes.
///
/// `serde_json` keeps object keys sorted, so the byte encoding of a payload
/// is stable and the checksum deterministic.
pub fn compute_payload_checksum(payload: &Value) -> StoreResult<String> {
    let bytes =
        serde_json::to_vec(payload).map_err(|e| StoreError::Serialization(e.to_string()))?;

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&bytes);
    Ok(format_checksum(hasher.finalize()))
}

/// Format a raw CRC32 value as `crc32:XXXXXXXX` (uppercase hex, zero padded).
pub fn format_checksum(value: u32) -> String {
    format!("crc32:{:08X}", value)
}
