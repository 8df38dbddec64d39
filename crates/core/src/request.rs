//! Transfer request/response shapes consumed and produced by the engine
//!
//! The authorization collaborator has already established that the caller may
//! move money out of `source` before a request reaches the engine.

use crate::account::AccountId;
use crate::amount::Amount;
use crate::entry::LedgerEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A request to move `amount` from `source` to `destination`.
///
/// Transient: nothing of the request survives beyond the journal entry it
/// produces (plus the idempotency key, if any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub source: AccountId,
    pub destination: AccountId,
    /// Raw amount as supplied by the caller; validated by the engine
    pub amount: Decimal,
    pub description: Option<String>,
    /// Caller-supplied token deduplicating retried requests
    pub idempotency_key: Option<String>,
}

impl TransferRequest {
    pub fn new(source: AccountId, destination: AccountId, amount: Decimal) -> Self {
        Self {
            source,
            destination,
            amount,
            description: None,
            idempotency_key: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Result of a committed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    /// The journal entry created by this transfer
    pub entry: LedgerEntry,
    /// Source balance after the debit
    pub new_source_balance: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_request_builders() {
        let req = TransferRequest::new(AccountId::new(1), AccountId::new(2), dec!(150.00))
            .with_description("rent")
            .with_idempotency_key("req-42");

        assert_eq!(req.description.as_deref(), Some("rent"));
        assert_eq!(req.idempotency_key.as_deref(), Some("req-42"));
    }
}
