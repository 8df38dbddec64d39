//! Ledger log contract consumed by the engine
//!
//! The engine only ever appends; reads happen through replay at startup and
//! through the journal reader. Keeping the append behind a trait lets tests
//! substitute a log that fails on demand.

use corebank_journal::{Journal, JournalError, JournalRecord, RecordBody};

/// Durable append-only sink for journal records.
///
/// `append` must assign the sequence id and make the record durable before
/// returning; an error means the record is NOT committed and the caller must
/// leave all in-memory state untouched.
pub trait LedgerLog: Send {
    fn append(&mut self, body: RecordBody) -> Result<JournalRecord, JournalError>;
}

impl LedgerLog for Journal {
    fn append(&mut self, body: RecordBody) -> Result<JournalRecord, JournalError> {
        Journal::append(self, body)
    }
}
