//! Hash chain utilities for journal integrity

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::error::JournalError;
use crate::record::{JournalRecord, RecordBody};

/// Sentinel `prev_hash` of the first record in a journal.
pub const GENESIS_HASH: &str = "GENESIS";

/// Calculate the SHA-256 hash of a record's content (excluding the hash
/// field itself).
pub fn record_hash(
    sequence: u64,
    prev_hash: &str,
    timestamp: &DateTime<Utc>,
    body: &RecordBody,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(timestamp.to_rfc3339().as_bytes());
    hasher.update(format!("{:?}", body).as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify linkage, hashes, and sequence monotonicity over a full journal.
pub fn verify_chain(records: &[JournalRecord]) -> Result<(), JournalError> {
    let mut prev_hash = GENESIS_HASH.to_string();
    let mut expected_sequence = 1u64;

    for record in records {
        if record.sequence != expected_sequence {
            return Err(JournalError::InvalidSequence {
                expected: expected_sequence,
                actual: record.sequence,
            });
        }

        if record.prev_hash != prev_hash {
            return Err(JournalError::BrokenChain {
                sequence: record.sequence,
                expected: prev_hash,
                actual: record.prev_hash.clone(),
            });
        }

        let calculated =
            record_hash(record.sequence, &record.prev_hash, &record.timestamp, &record.body);
        if record.hash != calculated {
            return Err(JournalError::HashMismatch {
                sequence: record.sequence,
            });
        }

        prev_hash = record.hash.clone();
        expected_sequence += 1;
    }

    Ok(())
}
