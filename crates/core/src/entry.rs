//! LedgerEntry - one committed value movement
//!
//! Entries are created exactly once, at the moment a movement commits, and
//! are never mutated or deleted afterwards.

use crate::account::AccountId;
use crate::amount::Amount;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Kind of a ledger entry
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Movement between two accounts
    Transfer,
    /// External money in; the source account is absent
    Deposit,
    /// External money out; debits the source account
    Withdrawal,
}

/// One committed, immutable value movement.
///
/// # Invariants
/// - `amount > 0`
/// - `source` is `None` only for deposits
/// - a withdrawal records the debited account in both columns (the
///   destination column is always populated); its net effect is the single
///   debit reported by [`LedgerEntry::signed_delta`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Monotonically increasing sequence id, assigned by the journal
    pub sequence: u64,
    pub source: Option<AccountId>,
    pub destination: AccountId,
    pub amount: Amount,
    pub kind: EntryKind,
    pub description: Option<String>,
    pub committed_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Signed effect of this entry on `account`'s balance.
    ///
    /// Credits are positive, debits negative; zero when the entry does not
    /// touch the account. An account's balance always equals its seed value
    /// plus the sum of these deltas over the whole journal (the
    /// reconciliation invariant).
    pub fn signed_delta(&self, account: AccountId) -> Decimal {
        let amount = self.amount.value();
        match self.kind {
            EntryKind::Transfer => {
                let mut delta = Decimal::ZERO;
                if self.source == Some(account) {
                    delta -= amount;
                }
                if self.destination == account {
                    delta += amount;
                }
                delta
            }
            EntryKind::Deposit => {
                if self.destination == account {
                    amount
                } else {
                    Decimal::ZERO
                }
            }
            EntryKind::Withdrawal => {
                if self.source == Some(account) {
                    -amount
                } else {
                    Decimal::ZERO
                }
            }
        }
    }

    /// True if the entry credits or debits `account`.
    pub fn touches(&self, account: AccountId) -> bool {
        self.source == Some(account) || self.destination == account
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(kind: EntryKind, source: Option<i64>, destination: i64) -> LedgerEntry {
        LedgerEntry {
            sequence: 1,
            source: source.map(AccountId::new),
            destination: AccountId::new(destination),
            amount: Amount::new(dec!(150.00)).unwrap(),
            kind,
            description: None,
            committed_at: Utc::now(),
        }
    }

    #[test]
    fn test_transfer_deltas() {
        let e = entry(EntryKind::Transfer, Some(1), 2);
        assert_eq!(e.signed_delta(AccountId::new(1)), dec!(-150.00));
        assert_eq!(e.signed_delta(AccountId::new(2)), dec!(150.00));
        assert_eq!(e.signed_delta(AccountId::new(3)), dec!(0));
    }

    #[test]
    fn test_deposit_delta() {
        let e = entry(EntryKind::Deposit, None, 2);
        assert_eq!(e.signed_delta(AccountId::new(2)), dec!(150.00));
        assert_eq!(e.signed_delta(AccountId::new(1)), dec!(0));
    }

    #[test]
    fn test_withdrawal_delta_is_single_debit() {
        // Withdrawals carry the account id in both columns; the credit side
        // must not be double counted.
        let e = entry(EntryKind::Withdrawal, Some(2), 2);
        assert_eq!(e.signed_delta(AccountId::new(2)), dec!(-150.00));
    }

    #[test]
    fn test_kind_serde_lowercase() {
        let json = serde_json::to_string(&EntryKind::Withdrawal).unwrap();
        assert_eq!(json, "\"withdrawal\"");
        let parsed: EntryKind = serde_json::from_str("\"transfer\"").unwrap();
        assert_eq!(parsed, EntryKind::Transfer);
    }

    #[test]
    fn test_touches() {
        let e = entry(EntryKind::Transfer, Some(1), 2);
        assert!(e.touches(AccountId::new(1)));
        assert!(e.touches(AccountId::new(2)));
        assert!(!e.touches(AccountId::new(9)));
    }
}
