//! CoreBank core - domain types shared across the workspace
//!
//! # Key Types
//! - `Amount`: non-negative, scale-2 decimal money
//! - `AccountId` / `AccountNumber` / `Account`: balance-holding entities
//! - `LedgerEntry`: one committed, immutable value movement
//! - `TransferRequest` / `TransferOutcome`: the engine's public shapes

pub mod account;
pub mod amount;
pub mod entry;
pub mod request;

pub use account::{Account, AccountError, AccountId, AccountNumber, AccountStatus};
pub use amount::{Amount, AmountError, MONEY_SCALE};
pub use entry::{EntryKind, LedgerEntry};
pub use request::{TransferOutcome, TransferRequest};
