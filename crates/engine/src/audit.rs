//! Reconciliation - proving live balances against the journal
//!
//! The reconciliation invariant: every account's balance equals its seed
//! value plus the signed sum of all ledger entries referencing it. The
//! report also totals the money supply so conservation (nothing created or
//! destroyed by transfers) is checkable at a glance.

use std::collections::HashMap;

use corebank_core::{Account, AccountId, EntryKind};
use corebank_journal::{JournalRecord, RecordBody};
use rust_decimal::Decimal;
use serde::Serialize;

/// One account whose live balance disagrees with the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileMismatch {
    pub account: AccountId,
    pub expected: Decimal,
    pub actual: Decimal,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub accounts_checked: usize,
    pub total_balance: Decimal,
    pub total_seeded: Decimal,
    pub total_deposited: Decimal,
    pub total_withdrawn: Decimal,
    pub mismatches: Vec<ReconcileMismatch>,
}

impl ReconcileReport {
    /// True when every balance matches its journal-derived value and the
    /// money supply adds up: seeds + deposits - withdrawals == live total.
    pub fn is_balanced(&self) -> bool {
        self.mismatches.is_empty()
            && self.total_balance
                == self.total_seeded + self.total_deposited - self.total_withdrawn
    }
}

/// Expected balance per account: seed plus signed entry deltas.
pub fn expected_balances(records: &[JournalRecord]) -> HashMap<AccountId, Decimal> {
    let mut expected: HashMap<AccountId, Decimal> = HashMap::new();

    for record in records {
        if let RecordBody::AccountOpened {
            account_id,
            opening_balance,
            ..
        } = &record.body
        {
            expected.insert(*account_id, opening_balance.value());
        }

        if let Some(entry) = record.to_entry() {
            let mut touched = vec![entry.destination];
            if let Some(source) = entry.source {
                if source != entry.destination {
                    touched.push(source);
                }
            }
            for id in touched {
                *expected.entry(id).or_insert(Decimal::ZERO) += entry.signed_delta(id);
            }
        }
    }

    expected
}

/// Reconcile a snapshot of live accounts against the journal they were
/// rebuilt from.
pub fn reconcile(records: &[JournalRecord], accounts: &[Account]) -> ReconcileReport {
    let expected = expected_balances(records);

    let mut total_seeded = Decimal::ZERO;
    let mut total_deposited = Decimal::ZERO;
    let mut total_withdrawn = Decimal::ZERO;

    for record in records {
        match &record.body {
            RecordBody::AccountOpened {
                opening_balance, ..
            } => total_seeded += opening_balance.value(),
            RecordBody::AccountClosed { .. } => {}
            RecordBody::Entry(movement) => match movement.kind {
                EntryKind::Deposit => total_deposited += movement.amount.value(),
                EntryKind::Withdrawal => total_withdrawn += movement.amount.value(),
                EntryKind::Transfer => {}
            },
        }
    }

    let mut total_balance = Decimal::ZERO;
    let mut mismatches = Vec::new();

    for account in accounts {
        let actual = account.balance.value();
        total_balance += actual;

        let journal_says = expected.get(&account.id).copied().unwrap_or(Decimal::ZERO);
        if journal_says != actual {
            mismatches.push(ReconcileMismatch {
                account: account.id,
                expected: journal_says,
                actual,
            });
        }
    }

    ReconcileReport {
        accounts_checked: accounts.len(),
        total_balance,
        total_seeded,
        total_deposited,
        total_withdrawn,
        mismatches,
    }
}
