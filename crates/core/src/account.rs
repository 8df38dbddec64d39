//! Account - balance-holding entity managed by the transfer engine
//!
//! Accounts are provisioned externally, mutated only by the transfer engine,
//! and never physically deleted: closing an account is a soft flag so journal
//! history can keep referencing its id.

use crate::amount::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Maximum length of an account number.
pub const ACCOUNT_NUMBER_MAX_LEN: usize = 20;

/// Errors raised while constructing account identity types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Invalid account number '{number}': {reason}")]
    InvalidNumber { number: String, reason: &'static str },
}

/// Stable numeric account identifier.
///
/// Assigned once by provisioning, monotonically increasing. The global lock
/// acquisition order over accounts is the ascending order of this id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct AccountId(i64);

impl AccountId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Displayed account number, unique and immutable once assigned.
///
/// 1 to 20 ASCII alphanumeric characters, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountNumber(String);

impl AccountNumber {
    pub fn new(number: impl Into<String>) -> Result<Self, AccountError> {
        let number = number.into();
        if number.is_empty() {
            return Err(AccountError::InvalidNumber {
                number,
                reason: "must not be empty",
            });
        }
        if number.len() > ACCOUNT_NUMBER_MAX_LEN {
            return Err(AccountError::InvalidNumber {
                number,
                reason: "longer than 20 characters",
            });
        }
        if !number.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AccountError::InvalidNumber {
                number,
                reason: "only ASCII letters and digits are allowed",
            });
        }
        Ok(Self(number.to_ascii_uppercase()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an account
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account participates in movements
    Active,
    /// Soft-deleted: rejects all movements, history stays readable
    Closed,
}

/// A balance-holding account.
///
/// # Invariant
/// `balance >= 0` at every commit boundary. The balance is mutated only by
/// the transfer engine while the account's lock is held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub number: AccountNumber,
    pub balance: Amount,
    pub status: AccountStatus,
    pub opened_at: DateTime<Utc>,
}

impl Account {
    /// Create a freshly provisioned account with its seed balance.
    pub fn open(id: AccountId, number: AccountNumber, seed: Amount) -> Self {
        Self {
            id,
            number,
            balance: seed,
            status: AccountStatus::Active,
            opened_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    pub fn close(&mut self) {
        self.status = AccountStatus::Closed;
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account {} ({}, balance: {}, status: {})",
            self.id, self.number, self.balance, self.status
        )
    }
}
