//! JSONL journal store - append-only writer
//!
//! One record per line, fsynced on append. The append is the commit point of
//! the whole engine: a record that made it to disk happened, anything else
//! did not. A torn final line (crash mid-append) is discarded on open.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::JournalError;
use crate::hash::{verify_chain, GENESIS_HASH};
use crate::record::{JournalRecord, RecordBody};

/// File name of the journal inside its data directory.
pub const JOURNAL_FILE: &str = "journal.jsonl";

/// Append-only journal writer.
///
/// Assigns sequence ids and extends the hash chain. All writes go through
/// [`Journal::append`]; nothing is ever rewritten in place.
pub struct Journal {
    path: PathBuf,
    writer: BufWriter<File>,
    next_sequence: u64,
    prev_hash: String,
}

impl Journal {
    /// Open (or create) the journal in `dir`, returning the writer plus all
    /// previously committed records for replay.
    ///
    /// Verifies the hash chain of the existing log and truncates a torn
    /// trailing line left by a crash mid-append. Corruption anywhere before
    /// the tail is an error, not something to repair silently.
    pub fn open(dir: impl AsRef<Path>) -> Result<(Self, Vec<JournalRecord>), JournalError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(JOURNAL_FILE);

        let mut records = Vec::new();
        let mut good_len: u64 = 0;
        let mut torn_line: Option<usize> = None;
        let mut needs_newline = false;

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let segments: Vec<&str> = content.split_inclusive('\n').collect();
            let mut offset: usize = 0;

            for (index, segment) in segments.iter().enumerate() {
                let line_no = index + 1;
                let terminated = segment.ends_with('\n');
                let line = segment.trim_end_matches(['\n', '\r']).trim();

                if line.is_empty() {
                    offset += segment.len();
                    good_len = offset as u64;
                    continue;
                }

                match serde_json::from_str::<JournalRecord>(line) {
                    Ok(record) => {
                        records.push(record);
                        offset += segment.len();
                        good_len = offset as u64;
                        if !terminated {
                            // Complete record, crash before the newline made
                            // it to disk. Keep it, restore the separator.
                            needs_newline = true;
                        }
                    }
                    Err(err) => {
                        let trailing = segments[index + 1..]
                            .iter()
                            .any(|s| !s.trim_end_matches(['\n', '\r']).trim().is_empty());
                        if trailing {
                            return Err(JournalError::Corrupt {
                                line: line_no,
                                reason: err.to_string(),
                            });
                        }
                        torn_line = Some(line_no);
                        break;
                    }
                }
            }
        }

        if let Some(line) = torn_line {
            tracing::warn!(line, path = %path.display(), "discarding torn trailing journal record");
            let file = OpenOptions::new().write(true).open(&path)?;
            file.set_len(good_len)?;
            file.sync_data()?;
        }

        verify_chain(&records)?;

        let (next_sequence, prev_hash) = match records.last() {
            Some(last) => (last.sequence + 1, last.hash.clone()),
            None => (1, GENESIS_HASH.to_string()),
        };

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        if needs_newline {
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        Ok((
            Self {
                path,
                writer,
                next_sequence,
                prev_hash,
            },
            records,
        ))
    }

    /// Durably append one record, assigning its sequence id.
    ///
    /// The record is flushed and fsynced before this returns; on any error
    /// the in-memory cursor does not advance and the caller must treat the
    /// record as not committed.
    pub fn append(&mut self, body: RecordBody) -> Result<JournalRecord, JournalError> {
        let record = JournalRecord::new(self.next_sequence, self.prev_hash.clone(), body);
        let json = serde_json::to_string(&record)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;

        self.next_sequence += 1;
        self.prev_hash = record.hash.clone();
        tracing::debug!(sequence = record.sequence, "journal record committed");
        Ok(record)
    }

    /// Sequence id the next appended record will receive.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Path of the underlying journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
