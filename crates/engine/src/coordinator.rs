//! Concurrency coordinator - deadlock-free account lock acquisition
//!
//! Every transfer must hold both participating accounts exclusively before
//! it reads a balance. Locks are always taken in ascending account id order,
//! whichever account is the source: two transfers over the same pair in
//! opposite directions therefore contend on the same first lock and can
//! never hold opposite halves of the pair.
//!
//! Both acquisitions share a single deadline; a transfer that cannot get
//! exclusivity in time aborts with no effect instead of waiting forever.

use std::time::Duration;

use corebank_core::{Account, AccountId};
use tokio::sync::OwnedMutexGuard;
use tokio::time::{timeout, Instant};

use crate::store::AccountCell;

/// Guards over both accounts of a transfer, mapped back to their roles.
pub(crate) struct LockedPair {
    pub source: OwnedMutexGuard<Account>,
    pub destination: OwnedMutexGuard<Account>,
}

/// Acquire one cell before the deadline expires.
async fn acquire(
    cell: AccountCell,
    deadline: Instant,
) -> Option<OwnedMutexGuard<Account>> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    timeout(remaining, cell.lock_owned()).await.ok()
}

/// Lock a single account within `wait`.
pub(crate) async fn lock_one(
    cell: AccountCell,
    wait: Duration,
) -> Option<OwnedMutexGuard<Account>> {
    acquire(cell, Instant::now() + wait).await
}

/// Lock both accounts of a transfer within `wait`, in ascending id order.
///
/// Returns `None` on timeout; any lock already taken is released on the way
/// out, so an aborted acquisition leaves nothing held. The caller guarantees
/// the two ids differ.
pub(crate) async fn lock_pair(
    source: (AccountId, AccountCell),
    destination: (AccountId, AccountCell),
    wait: Duration,
) -> Option<LockedPair> {
    let deadline = Instant::now() + wait;
    let source_first = source.0 < destination.0;

    let (first, second) = if source_first {
        (source.1, destination.1)
    } else {
        (destination.1, source.1)
    };

    let first_guard = acquire(first, deadline).await?;
    let second_guard = acquire(second, deadline).await?;

    if source_first {
        Some(LockedPair {
            source: first_guard,
            destination: second_guard,
        })
    } else {
        Some(LockedPair {
            source: second_guard,
            destination: first_guard,
        })
    }
}
