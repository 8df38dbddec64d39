//! Journal replay - rebuilding engine state at startup
//!
//! The journal is the source of truth; balances, account status, the id
//! allocator, and the idempotency index are all projections of it. Replay
//! re-applies every record with checked arithmetic and cross-checks the
//! balances each movement recorded at commit time, so a log that disagrees
//! with itself refuses to load.

use std::collections::HashMap;

use corebank_core::{Account, AccountId, AccountStatus, Amount, LedgerEntry, TransferOutcome};
use corebank_journal::{JournalRecord, RecordBody};
use rust_decimal::Decimal;

use crate::error::RecoveryError;

/// State rebuilt from a full journal replay.
pub(crate) struct ReplayState {
    pub accounts: Vec<Account>,
    pub idempotency: HashMap<String, TransferOutcome>,
}

pub(crate) fn replay(records: &[JournalRecord]) -> Result<ReplayState, RecoveryError> {
    let mut accounts: HashMap<AccountId, Account> = HashMap::new();
    let mut numbers: HashMap<String, AccountId> = HashMap::new();
    let mut idempotency: HashMap<String, TransferOutcome> = HashMap::new();

    for record in records {
        match &record.body {
            RecordBody::AccountOpened {
                account_id,
                number,
                opening_balance,
            } => {
                if accounts.contains_key(account_id) {
                    return Err(RecoveryError::DuplicateAccount(*account_id));
                }
                if numbers.contains_key(number.as_str()) {
                    return Err(RecoveryError::DuplicateNumber(number.clone()));
                }
                let account = Account {
                    id: *account_id,
                    number: number.clone(),
                    balance: *opening_balance,
                    status: AccountStatus::Active,
                    opened_at: record.timestamp,
                };
                numbers.insert(number.as_str().to_string(), *account_id);
                accounts.insert(*account_id, account);
            }

            RecordBody::AccountClosed { account_id } => {
                let account =
                    accounts
                        .get_mut(account_id)
                        .ok_or(RecoveryError::UnknownAccount {
                            sequence: record.sequence,
                            account: *account_id,
                        })?;
                account.status = AccountStatus::Closed;
            }

            RecordBody::Entry(movement) => {
                let entry = LedgerEntry {
                    sequence: record.sequence,
                    source: movement.source,
                    destination: movement.destination,
                    amount: movement.amount,
                    kind: movement.kind,
                    description: movement.description.clone(),
                    committed_at: record.timestamp,
                };

                let mut touched = vec![entry.destination];
                if let Some(source) = entry.source {
                    if source != entry.destination {
                        touched.push(source);
                    }
                }

                for id in touched {
                    let account =
                        accounts.get_mut(&id).ok_or(RecoveryError::UnknownAccount {
                            sequence: record.sequence,
                            account: id,
                        })?;

                    let delta = entry.signed_delta(id);
                    let replayed = account.balance.value().checked_add(delta).ok_or(
                        RecoveryError::ReplayedOverflow {
                            sequence: record.sequence,
                            account: id,
                        },
                    )?;
                    if replayed < Decimal::ZERO {
                        return Err(RecoveryError::ReplayedNegative {
                            sequence: record.sequence,
                            account: id,
                        });
                    }
                    account.balance = Amount::new_unchecked(replayed);
                }

                // Cross-check against the balances the movement recorded
                if let (Some(recorded), Some(source)) =
                    (movement.source_balance_after, entry.source)
                {
                    check_recorded(record.sequence, source, recorded, &accounts)?;
                }
                if let Some(recorded) = movement.destination_balance_after {
                    check_recorded(record.sequence, entry.destination, recorded, &accounts)?;
                }

                if let Some(key) = &movement.idempotency_key {
                    if idempotency.contains_key(key) {
                        return Err(RecoveryError::DuplicateIdempotencyKey(key.clone()));
                    }
                    let new_source_balance = entry
                        .source
                        .and_then(|id| accounts.get(&id))
                        .map(|account| account.balance)
                        .unwrap_or(Amount::ZERO);
                    idempotency.insert(
                        key.clone(),
                        TransferOutcome {
                            entry: entry.clone(),
                            new_source_balance,
                        },
                    );
                }
            }
        }
    }

    let mut accounts: Vec<Account> = accounts.into_values().collect();
    accounts.sort_by_key(|account| account.id);

    Ok(ReplayState {
        accounts,
        idempotency,
    })
}

fn check_recorded(
    sequence: u64,
    account: AccountId,
    recorded: Amount,
    accounts: &HashMap<AccountId, Account>,
) -> Result<(), RecoveryError> {
    let replayed = accounts
        .get(&account)
        .map(|a| a.balance.value())
        .unwrap_or(Decimal::ZERO);
    if recorded.value() != replayed {
        return Err(RecoveryError::BalanceMismatch {
            sequence,
            account,
            recorded: recorded.value(),
            replayed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corebank_core::{AccountNumber, EntryKind};
    use corebank_journal::{Movement, RecordBody, GENESIS_HASH};
    use rust_decimal_macros::dec;

    struct ChainBuilder {
        records: Vec<JournalRecord>,
        prev_hash: String,
    }

    impl ChainBuilder {
        fn new() -> Self {
            Self {
                records: Vec::new(),
                prev_hash: GENESIS_HASH.to_string(),
            }
        }

        fn push(&mut self, body: RecordBody) -> &JournalRecord {
            let sequence = self.records.len() as u64 + 1;
            let record = JournalRecord::new(sequence, self.prev_hash.clone(), body);
            self.prev_hash = record.hash.clone();
            self.records.push(record);
            self.records.last().unwrap()
        }

        fn opened(&mut self, id: i64, balance: Decimal) {
            self.push(RecordBody::AccountOpened {
                account_id: AccountId::new(id),
                number: AccountNumber::new(format!("ACC{:03}", id)).unwrap(),
                opening_balance: Amount::new(balance).unwrap(),
            });
        }

        fn transfer(&mut self, source: i64, destination: i64, amount: Decimal) {
            self.push(RecordBody::Entry(Movement {
                source: Some(AccountId::new(source)),
                destination: AccountId::new(destination),
                amount: Amount::new(amount).unwrap(),
                kind: EntryKind::Transfer,
                description: None,
                idempotency_key: None,
                source_balance_after: None,
                destination_balance_after: None,
            }));
        }
    }

    #[test]
    fn test_replay_rebuilds_balances() {
        let mut chain = ChainBuilder::new();
        chain.opened(1, dec!(500));
        chain.opened(2, dec!(100));
        chain.transfer(1, 2, dec!(150));

        let state = replay(&chain.records).unwrap();
        assert_eq!(state.accounts.len(), 2);
        assert_eq!(state.accounts[0].balance.value(), dec!(350));
        assert_eq!(state.accounts[1].balance.value(), dec!(250));
    }

    #[test]
    fn test_replay_rejects_unknown_account() {
        let mut chain = ChainBuilder::new();
        chain.opened(1, dec!(500));
        chain.transfer(1, 9, dec!(10));

        let result = replay(&chain.records);
        assert!(matches!(
            result,
            Err(RecoveryError::UnknownAccount { sequence: 2, .. })
        ));
    }

    #[test]
    fn test_replay_rejects_negative_drift() {
        let mut chain = ChainBuilder::new();
        chain.opened(1, dec!(50));
        chain.opened(2, dec!(0));
        chain.transfer(1, 2, dec!(80));

        let result = replay(&chain.records);
        assert!(matches!(result, Err(RecoveryError::ReplayedNegative { .. })));
    }

    #[test]
    fn test_replay_cross_checks_recorded_balances() {
        let mut chain = ChainBuilder::new();
        chain.opened(1, dec!(500));
        chain.opened(2, dec!(100));
        chain.push(RecordBody::Entry(Movement {
            source: Some(AccountId::new(1)),
            destination: AccountId::new(2),
            amount: Amount::new(dec!(150)).unwrap(),
            kind: EntryKind::Transfer,
            description: None,
            idempotency_key: None,
            // Lies about the post-commit source balance
            source_balance_after: Some(Amount::new(dec!(999)).unwrap()),
            destination_balance_after: None,
        }));

        let result = replay(&chain.records);
        assert!(matches!(result, Err(RecoveryError::BalanceMismatch { .. })));
    }

    #[test]
    fn test_replay_rebuilds_idempotency_index() {
        let mut chain = ChainBuilder::new();
        chain.opened(1, dec!(500));
        chain.opened(2, dec!(100));
        chain.push(RecordBody::Entry(Movement {
            source: Some(AccountId::new(1)),
            destination: AccountId::new(2),
            amount: Amount::new(dec!(150)).unwrap(),
            kind: EntryKind::Transfer,
            description: None,
            idempotency_key: Some("req-1".to_string()),
            source_balance_after: Some(Amount::new(dec!(350)).unwrap()),
            destination_balance_after: Some(Amount::new(dec!(250)).unwrap()),
        }));

        let state = replay(&chain.records).unwrap();
        let outcome = state.idempotency.get("req-1").unwrap();
        assert_eq!(outcome.entry.sequence, 3);
        assert_eq!(outcome.new_source_balance.value(), dec!(350));
    }

    #[test]
    fn test_replay_closed_status() {
        let mut chain = ChainBuilder::new();
        chain.opened(1, dec!(0));
        chain.push(RecordBody::AccountClosed {
            account_id: AccountId::new(1),
        });

        let state = replay(&chain.records).unwrap();
        assert_eq!(state.accounts[0].status, AccountStatus::Closed);
    }
}
