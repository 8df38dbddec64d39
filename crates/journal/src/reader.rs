//! Journal reader - sequential replay and history queries

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use corebank_core::{AccountId, LedgerEntry};

use crate::error::JournalError;
use crate::hash::verify_chain;
use crate::record::JournalRecord;
use crate::store::JOURNAL_FILE;

/// Read-only view over a journal directory.
pub struct JournalReader {
    path: PathBuf,
}

impl JournalReader {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(JOURNAL_FILE),
        }
    }

    /// Read all records in commit order.
    ///
    /// A missing file is an empty journal. Unparseable lines are an error
    /// here; tail repair belongs to the writer, not to readers.
    pub fn read_all(&self) -> Result<Vec<JournalRecord>, JournalError> {
        let mut records = Vec::new();

        if !self.path.exists() {
            return Ok(records);
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: JournalRecord =
                serde_json::from_str(line).map_err(|err| JournalError::Corrupt {
                    line: index + 1,
                    reason: err.to_string(),
                })?;
            records.push(record);
        }

        Ok(records)
    }

    /// Read all records and verify the hash chain.
    pub fn read_verified(&self) -> Result<Vec<JournalRecord>, JournalError> {
        let records = self.read_all()?;
        verify_chain(&records)?;
        Ok(records)
    }

    /// All committed ledger entries, in commit order.
    pub fn entries(&self) -> Result<Vec<LedgerEntry>, JournalError> {
        Ok(self
            .read_all()?
            .iter()
            .filter_map(JournalRecord::to_entry)
            .collect())
    }

    /// Entries touching `account`, newest first, with limit/offset paging.
    pub fn entries_for_account(
        &self,
        account: AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntry>, JournalError> {
        Ok(self
            .entries()?
            .into_iter()
            .rev()
            .filter(|entry| entry.touches(account))
            .skip(offset)
            .take(limit)
            .collect())
    }
}
