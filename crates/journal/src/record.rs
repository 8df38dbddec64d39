//! Journal records - the durable line format of the ledger log
//!
//! Every state change is one record: account lifecycle records carry the
//! seed and close events, `entry` records carry the value movements. Records
//! are hash-chained and never rewritten.

use chrono::{DateTime, Utc};
use corebank_core::{Account, AccountId, AccountNumber, Amount, EntryKind, LedgerEntry};
use serde::{Deserialize, Serialize};

use crate::hash::record_hash;

/// A value movement as persisted in the journal.
///
/// The post-commit balances are recorded alongside the movement so the log
/// doubles as an audit trail and replay can cross-check itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub source: Option<AccountId>,
    pub destination: AccountId,
    pub amount: Amount,
    pub kind: EntryKind,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_balance_after: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_balance_after: Option<Amount>,
}

/// Payload of one journal record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordBody {
    /// An account came into existence with its seed balance
    AccountOpened {
        account_id: AccountId,
        number: AccountNumber,
        opening_balance: Amount,
    },
    /// Soft close; the id stays referenced by history forever
    AccountClosed { account_id: AccountId },
    /// A committed value movement
    Entry(Movement),
}

/// One hash-chained journal line.
///
/// # Invariants
/// - `sequence` starts at 1 and increases by exactly 1 per record
/// - `prev_hash` links to the previous record's `hash` (`GENESIS` for the
///   first record)
/// - immutable once written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub prev_hash: String,
    pub hash: String,
    #[serde(flatten)]
    pub body: RecordBody,
}

impl JournalRecord {
    /// Build a record and stamp its chain hash.
    pub fn new(sequence: u64, prev_hash: String, body: RecordBody) -> Self {
        let timestamp = Utc::now();
        let hash = record_hash(sequence, &prev_hash, &timestamp, &body);
        Self {
            sequence,
            timestamp,
            prev_hash,
            hash,
            body,
        }
    }

    /// View this record as the `LedgerEntry` it committed, if it is one.
    pub fn to_entry(&self) -> Option<LedgerEntry> {
        match &self.body {
            RecordBody::Entry(movement) => Some(LedgerEntry {
                sequence: self.sequence,
                source: movement.source,
                destination: movement.destination,
                amount: movement.amount,
                kind: movement.kind,
                description: movement.description.clone(),
                committed_at: self.timestamp,
            }),
            _ => None,
        }
    }

    /// Seed account state for replay, if this is an `account_opened` record.
    pub fn to_opened_account(&self) -> Option<Account> {
        match &self.body {
            RecordBody::AccountOpened {
                account_id,
                number,
                opening_balance,
            } => Some(Account {
                id: *account_id,
                number: number.clone(),
                balance: *opening_balance,
                status: corebank_core::AccountStatus::Active,
                opened_at: self.timestamp,
            }),
            _ => None,
        }
    }
}
