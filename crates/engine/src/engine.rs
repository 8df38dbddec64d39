//! The transfer engine
//!
//! `Bank` owns the account store, the journal, and the idempotency index,
//! and is the only code that mutates balances. Every movement follows the
//! same protocol: validate, acquire account exclusivity in global id order,
//! re-check under the locks, append the journal record (the commit point),
//! then assign the new balances. Nothing mutates before the append
//! succeeds, so any failure is a rollback by construction.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use corebank_core::{
    Account, AccountId, AccountNumber, Amount, EntryKind, LedgerEntry, TransferOutcome,
    TransferRequest,
};
use corebank_journal::{Journal, JournalRecord, Movement, RecordBody};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::audit::{self, ReconcileReport};
use crate::coordinator;
use crate::error::{ProvisionError, RecoveryError, TransferError};
use crate::log::LedgerLog;
use crate::recovery;
use crate::store::AccountStore;

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct BankConfig {
    /// Bound on waiting for account exclusivity before a movement aborts
    /// with `LockTimeout`.
    pub lock_timeout: Duration,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
        }
    }
}

/// The core transactional ledger.
///
/// Safe under parallel invocation from any number of tasks; transfers on
/// disjoint account pairs proceed concurrently, transfers sharing an account
/// are linearized by that account's lock.
pub struct Bank<L: LedgerLog = Journal> {
    store: AccountStore,
    log: Mutex<L>,
    idempotency: Mutex<HashMap<String, TransferOutcome>>,
    config: BankConfig,
}

impl Bank<Journal> {
    /// Open the bank over the journal in `dir`, replaying all history.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, RecoveryError> {
        Self::open_with_config(dir, BankConfig::default())
    }

    pub fn open_with_config(
        dir: impl AsRef<Path>,
        config: BankConfig,
    ) -> Result<Self, RecoveryError> {
        let (journal, records) = Journal::open(dir)?;
        Self::from_log(journal, &records, config)
    }
}

impl<L: LedgerLog> Bank<L> {
    /// Build a bank over an already-opened log plus its replayed records.
    ///
    /// This is the seam the integration tests use to inject failing logs.
    pub fn from_log(
        log: L,
        records: &[JournalRecord],
        config: BankConfig,
    ) -> Result<Self, RecoveryError> {
        let state = recovery::replay(records)?;

        Ok(Self {
            store: AccountStore::from_accounts(state.accounts),
            log: Mutex::new(log),
            idempotency: Mutex::new(state.idempotency),
            config,
        })
    }

    /// Move `request.amount` from the source to the destination account.
    ///
    /// On success the debit, the credit, and the journal entry commit as one
    /// unit; the outcome carries the created entry and the new source
    /// balance. A request re-sent with an idempotency key already committed
    /// returns the original outcome without moving money again. Requests
    /// WITHOUT a key are not deduplicated: a blind retry after a timeout can
    /// double-apply, which is the caller's risk to manage.
    pub async fn transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferOutcome, TransferError> {
        let amount = validate_amount(request.amount)?;

        if request.source == request.destination {
            return Err(TransferError::SelfTransfer);
        }

        // Fast idempotency path: a committed retry never touches the locks
        if let Some(key) = &request.idempotency_key {
            if let Some(prior) = self.idempotency.lock().await.get(key) {
                tracing::debug!(key = %key, "idempotent replay served before locking");
                return Ok(prior.clone());
            }
        }

        let source_cell = self
            .store
            .cell(request.source)
            .await
            .ok_or(TransferError::SourceNotFound(request.source))?;
        let destination_cell = self
            .store
            .cell(request.destination)
            .await
            .ok_or(TransferError::DestinationNotFound(request.destination))?;

        let pair = coordinator::lock_pair(
            (request.source, source_cell),
            (request.destination, destination_cell),
            self.config.lock_timeout,
        )
        .await
        .ok_or(TransferError::LockTimeout(self.config.lock_timeout))?;
        let mut source = pair.source;
        let mut destination = pair.destination;

        if !source.is_active() {
            return Err(TransferError::AccountClosed(request.source));
        }
        if !destination.is_active() {
            return Err(TransferError::AccountClosed(request.destination));
        }

        // Re-check the key now that the pair is exclusive: a racing retry of
        // the same request serializes on these locks.
        if let Some(key) = &request.idempotency_key {
            if let Some(prior) = self.idempotency.lock().await.get(key) {
                return Ok(prior.clone());
            }
        }

        // The balance check happens here and only here: both locks held
        if source.balance.value() < amount.value() {
            return Err(TransferError::InsufficientFunds {
                needed: amount.value(),
                available: source.balance.value(),
            });
        }

        let new_source = source
            .balance
            .checked_sub(&amount)
            .ok_or(TransferError::NegativeBalance(request.source))?;
        let new_destination = destination
            .balance
            .checked_add(&amount)
            .ok_or(TransferError::BalanceOverflow(request.destination))?;

        let record = self
            .append(RecordBody::Entry(Movement {
                source: Some(request.source),
                destination: request.destination,
                amount,
                kind: EntryKind::Transfer,
                description: request.description.clone(),
                idempotency_key: request.idempotency_key.clone(),
                source_balance_after: Some(new_source),
                destination_balance_after: Some(new_destination),
            }))
            .await?;

        // Commit point passed; the assignments below cannot fail
        source.balance = new_source;
        destination.balance = new_destination;

        let outcome = TransferOutcome {
            entry: LedgerEntry {
                sequence: record.sequence,
                source: Some(request.source),
                destination: request.destination,
                amount,
                kind: EntryKind::Transfer,
                description: request.description,
                committed_at: record.timestamp,
            },
            new_source_balance: new_source,
        };

        if let Some(key) = request.idempotency_key {
            // Inserted while the pair is still locked
            self.idempotency.lock().await.insert(key, outcome.clone());
        }

        tracing::info!(
            sequence = outcome.entry.sequence,
            source = %request.source,
            destination = %request.destination,
            amount = %amount,
            "transfer committed"
        );
        Ok(outcome)
    }

    /// Credit external money to an account (no source side).
    pub async fn deposit(
        &self,
        destination: AccountId,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<LedgerEntry, TransferError> {
        let amount = validate_amount(amount)?;

        let cell = self
            .store
            .cell(destination)
            .await
            .ok_or(TransferError::DestinationNotFound(destination))?;
        let mut account = coordinator::lock_one(cell, self.config.lock_timeout)
            .await
            .ok_or(TransferError::LockTimeout(self.config.lock_timeout))?;

        if !account.is_active() {
            return Err(TransferError::AccountClosed(destination));
        }

        let new_balance = account
            .balance
            .checked_add(&amount)
            .ok_or(TransferError::BalanceOverflow(destination))?;

        let record = self
            .append(RecordBody::Entry(Movement {
                source: None,
                destination,
                amount,
                kind: EntryKind::Deposit,
                description: description.clone(),
                idempotency_key: None,
                source_balance_after: None,
                destination_balance_after: Some(new_balance),
            }))
            .await?;

        account.balance = new_balance;
        tracing::info!(sequence = record.sequence, account = %destination, amount = %amount, "deposit committed");

        Ok(LedgerEntry {
            sequence: record.sequence,
            source: None,
            destination,
            amount,
            kind: EntryKind::Deposit,
            description,
            committed_at: record.timestamp,
        })
    }

    /// Debit external money out of an account.
    pub async fn withdraw(
        &self,
        source: AccountId,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<LedgerEntry, TransferError> {
        let amount = validate_amount(amount)?;

        let cell = self
            .store
            .cell(source)
            .await
            .ok_or(TransferError::SourceNotFound(source))?;
        let mut account = coordinator::lock_one(cell, self.config.lock_timeout)
            .await
            .ok_or(TransferError::LockTimeout(self.config.lock_timeout))?;

        if !account.is_active() {
            return Err(TransferError::AccountClosed(source));
        }

        if account.balance.value() < amount.value() {
            return Err(TransferError::InsufficientFunds {
                needed: amount.value(),
                available: account.balance.value(),
            });
        }

        let new_balance = account
            .balance
            .checked_sub(&amount)
            .ok_or(TransferError::NegativeBalance(source))?;

        let record = self
            .append(RecordBody::Entry(Movement {
                source: Some(source),
                destination: source,
                amount,
                kind: EntryKind::Withdrawal,
                description: description.clone(),
                idempotency_key: None,
                source_balance_after: Some(new_balance),
                destination_balance_after: None,
            }))
            .await?;

        account.balance = new_balance;
        tracing::info!(sequence = record.sequence, account = %source, amount = %amount, "withdrawal committed");

        Ok(LedgerEntry {
            sequence: record.sequence,
            source: Some(source),
            destination: source,
            amount,
            kind: EntryKind::Withdrawal,
            description,
            committed_at: record.timestamp,
        })
    }

    /// Provision a new account with a seed balance.
    pub async fn open_account(
        &self,
        number: AccountNumber,
        opening_balance: Decimal,
    ) -> Result<Account, ProvisionError> {
        let opening_balance = Amount::new(opening_balance)?;

        // Journal lock first: provisioning is serialized, so the uniqueness
        // check below cannot race another open.
        let mut log = self.log.lock().await;

        if self.store.number_exists(&number).await {
            return Err(ProvisionError::NumberTaken(number));
        }

        let id = self.store.allocate_id();
        let record = log.append(RecordBody::AccountOpened {
            account_id: id,
            number: number.clone(),
            opening_balance,
        })?;

        let account = Account {
            id,
            number,
            balance: opening_balance,
            status: corebank_core::AccountStatus::Active,
            opened_at: record.timestamp,
        };
        self.store.insert(account.clone()).await;

        tracing::info!(account = %id, number = %account.number, seed = %opening_balance, "account opened");
        Ok(account)
    }

    /// Soft-close an account. Refused while the balance is nonzero; the id
    /// stays resolvable forever because journal history references it.
    pub async fn close_account(&self, id: AccountId) -> Result<Account, ProvisionError> {
        let cell = self
            .store
            .cell(id)
            .await
            .ok_or(ProvisionError::NotFound(id))?;
        let mut account = coordinator::lock_one(cell, self.config.lock_timeout)
            .await
            .ok_or(ProvisionError::LockTimeout(self.config.lock_timeout))?;

        if !account.is_active() {
            return Err(ProvisionError::AlreadyClosed(id));
        }
        if !account.balance.is_zero() {
            return Err(ProvisionError::NonZeroBalance {
                id,
                balance: account.balance,
            });
        }

        self.log
            .lock()
            .await
            .append(RecordBody::AccountClosed { account_id: id })?;
        account.close();

        tracing::info!(account = %id, "account closed");
        Ok(account.clone())
    }

    /// Current state of one account.
    pub async fn account(&self, id: AccountId) -> Option<Account> {
        let cell = self.store.cell(id).await?;
        let account = cell.lock().await;
        Some(account.clone())
    }

    /// Current balance of one account.
    pub async fn balance(&self, id: AccountId) -> Option<Amount> {
        self.account(id).await.map(|account| account.balance)
    }

    /// Snapshot of every account, sorted by id.
    pub async fn accounts(&self) -> Vec<Account> {
        self.store.snapshot().await
    }

    /// Reconcile live balances against the journal records they were built
    /// from.
    pub async fn reconcile(&self, records: &[JournalRecord]) -> ReconcileReport {
        let accounts = self.store.snapshot().await;
        audit::reconcile(records, &accounts)
    }

    async fn append(&self, body: RecordBody) -> Result<JournalRecord, TransferError> {
        match self.log.lock().await.append(body) {
            Ok(record) => Ok(record),
            Err(err) => {
                tracing::warn!(error = %err, "journal append failed, movement rolled back");
                Err(TransferError::Storage(err))
            }
        }
    }
}

fn validate_amount(value: Decimal) -> Result<Amount, TransferError> {
    let amount =
        Amount::new(value).map_err(|err| TransferError::InvalidAmount(err.to_string()))?;
    if !amount.is_positive() {
        return Err(TransferError::InvalidAmount(
            "amount must be greater than 0".to_string(),
        ));
    }
    Ok(amount)
}
