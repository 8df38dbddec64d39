//! CoreBank engine - the transactional heart of the ledger
//!
//! Moves value between account balances and durably records every movement,
//! guaranteeing that money is neither created nor destroyed and that
//! concurrent transfers never corrupt balances.
//!
//! # Key Types
//! - `Bank`: the transfer engine; the only mutator of balances
//! - `BankConfig`: lock wait bound
//! - `TransferError` / `ProvisionError` / `RecoveryError`: failure taxonomy
//! - `LedgerLog`: the append contract the engine consumes
//!
//! # Protocol
//! Validate → lock both accounts in ascending id order (bounded wait) →
//! check the balance under the locks → append the journal record (commit
//! point) → assign new balances. A crash or storage failure before the
//! append leaves nothing behind; recovery replays the journal.

pub mod audit;
mod coordinator;
pub mod engine;
pub mod error;
pub mod log;
mod recovery;
mod store;

pub use audit::{expected_balances, reconcile, ReconcileMismatch, ReconcileReport};
pub use engine::{Bank, BankConfig};
pub use error::{ProvisionError, RecoveryError, TransferError};
pub use log::LedgerLog;
