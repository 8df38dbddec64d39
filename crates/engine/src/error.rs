//! Engine errors
//!
//! One enum per concern: `TransferError` for the movement path,
//! `ProvisionError` for account lifecycle, `RecoveryError` for journal
//! replay at startup. Every variant carries a stable machine-readable kind
//! string for the API layer to map onto transport status codes.

use std::time::Duration;

use corebank_core::{AccountError, AccountId, AccountNumber, Amount, AmountError};
use corebank_journal::JournalError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the transfer / deposit / withdraw paths.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Cannot transfer to the same account")]
    SelfTransfer,

    #[error("Source account not found: {0}")]
    SourceNotFound(AccountId),

    #[error("Destination account not found: {0}")]
    DestinationNotFound(AccountId),

    #[error("Account is closed: {0}")]
    AccountClosed(AccountId),

    #[error("Insufficient balance: need {needed}, available {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    #[error("Balance of account {0} would go negative")]
    NegativeBalance(AccountId),

    #[error("Balance of account {0} would overflow")]
    BalanceOverflow(AccountId),

    #[error("Could not acquire account locks within {0:?}")]
    LockTimeout(Duration),

    #[error("Storage failure: {0}")]
    Storage(#[from] JournalError),
}

impl TransferError {
    /// Stable machine-readable kind, independent of the display message.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount(_) => "invalid_amount",
            TransferError::SelfTransfer => "self_transfer",
            TransferError::SourceNotFound(_) => "source_not_found",
            TransferError::DestinationNotFound(_) => "destination_not_found",
            TransferError::AccountClosed(_) => "account_closed",
            TransferError::InsufficientFunds { .. } => "insufficient_funds",
            TransferError::NegativeBalance(_) => "negative_balance",
            TransferError::BalanceOverflow(_) => "balance_overflow",
            TransferError::LockTimeout(_) => "lock_timeout",
            TransferError::Storage(_) => "storage_failure",
        }
    }

    /// True for outcomes worth retrying. Retries are only safe with an
    /// idempotency key; the engine never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransferError::LockTimeout(_) | TransferError::Storage(_)
        )
    }

    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, TransferError::InsufficientFunds { .. })
    }
}

/// Errors surfaced by account provisioning (open / close).
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Account number already exists: {0}")]
    NumberTaken(AccountNumber),

    #[error("Account not found: {0}")]
    NotFound(AccountId),

    #[error("Account is already closed: {0}")]
    AlreadyClosed(AccountId),

    #[error("Account {id} still holds {balance}; closing requires a zero balance")]
    NonZeroBalance { id: AccountId, balance: Amount },

    #[error("Invalid opening balance: {0}")]
    InvalidSeed(#[from] AmountError),

    #[error("Invalid account number: {0}")]
    InvalidNumber(#[from] AccountError),

    #[error("Could not acquire the account lock within {0:?}")]
    LockTimeout(Duration),

    #[error("Storage failure: {0}")]
    Storage(#[from] JournalError),
}

/// Errors detected while rebuilding state from the journal.
///
/// Any of these means the log and the engine disagree about history;
/// refusing to start is the only safe response.
#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error("Record {sequence} references unknown account {account}")]
    UnknownAccount { sequence: u64, account: AccountId },

    #[error("Duplicate account id {0} in journal")]
    DuplicateAccount(AccountId),

    #[error("Duplicate account number {0} in journal")]
    DuplicateNumber(AccountNumber),

    #[error("Duplicate idempotency key '{0}' in journal")]
    DuplicateIdempotencyKey(String),

    #[error("Replaying record {sequence} drove account {account} negative")]
    ReplayedNegative { sequence: u64, account: AccountId },

    #[error("Replaying record {sequence} overflowed account {account}")]
    ReplayedOverflow { sequence: u64, account: AccountId },

    #[error(
        "Record {sequence} recorded balance {recorded} for account {account}, replay computed {replayed}"
    )]
    BalanceMismatch {
        sequence: u64,
        account: AccountId,
        recorded: Decimal,
        replayed: Decimal,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_strings_are_stable() {
        let err = TransferError::InsufficientFunds {
            needed: dec!(100),
            available: dec!(50),
        };
        assert_eq!(err.kind(), "insufficient_funds");
        assert!(err.is_insufficient_funds());
        assert!(!err.is_retryable());

        assert_eq!(TransferError::SelfTransfer.kind(), "self_transfer");
        assert!(TransferError::LockTimeout(Duration::from_secs(5)).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = TransferError::InsufficientFunds {
            needed: dec!(100),
            available: dec!(50),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: need 100, available 50"
        );
    }
}
