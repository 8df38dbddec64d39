//! Journal errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt journal at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("Broken hash chain at sequence {sequence}: expected prev_hash '{expected}', got '{actual}'")]
    BrokenChain {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Record hash mismatch at sequence {sequence}")]
    HashMismatch { sequence: u64 },

    #[error("Sequence must increase strictly: expected {expected}, got {actual}")]
    InvalidSequence { expected: u64, actual: u64 },
}
