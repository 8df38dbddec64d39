//! CoreBank journal - the append-only ledger log
//!
//! Every state change of the ledger is one hash-chained JSONL record; the
//! durable append is the commit point for the whole system. Balances are a
//! projection of this log and can always be rebuilt from it.
//!
//! # Key Types
//! - `Journal`: append-only writer, assigns sequence ids
//! - `JournalReader`: sequential replay and history queries
//! - `JournalRecord` / `RecordBody` / `Movement`: the line format

pub mod error;
pub mod hash;
pub mod reader;
pub mod record;
pub mod store;

pub use error::JournalError;
pub use hash::{record_hash, verify_chain, GENESIS_HASH};
pub use reader::JournalReader;
pub use record::{JournalRecord, Movement, RecordBody};
pub use store::{Journal, JOURNAL_FILE};
