//! In-memory account store
//!
//! The authoritative registry of live account state, rebuilt from the
//! journal at startup. Each account sits behind its own async mutex; holding
//! that guard is the engine's exclusive access to the row. The maps
//! themselves are only locked for lookups and inserts, never across an await
//! on an account cell.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use corebank_core::{Account, AccountId, AccountNumber};
use tokio::sync::{Mutex, RwLock};

/// One lockable account slot.
pub(crate) type AccountCell = Arc<Mutex<Account>>;

/// Registry of all accounts known to the engine.
pub(crate) struct AccountStore {
    cells: RwLock<HashMap<AccountId, AccountCell>>,
    numbers: RwLock<HashMap<String, AccountId>>,
    next_id: AtomicI64,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::from_accounts(Vec::new())
    }

    /// Build a store from replayed accounts, before it is shared with any
    /// task. The id allocator resumes after the highest replayed id.
    pub fn from_accounts(accounts: Vec<Account>) -> Self {
        let mut cells = HashMap::new();
        let mut numbers = HashMap::new();
        let mut max_id = 0i64;

        for account in accounts {
            max_id = max_id.max(account.id.value());
            numbers.insert(account.number.as_str().to_string(), account.id);
            cells.insert(account.id, Arc::new(Mutex::new(account)));
        }

        Self {
            cells: RwLock::new(cells),
            numbers: RwLock::new(numbers),
            next_id: AtomicI64::new(max_id + 1),
        }
    }

    /// Look up the cell for `id`. The returned Arc is cloned out so no map
    /// guard is held while the caller awaits the cell's mutex.
    pub async fn cell(&self, id: AccountId) -> Option<AccountCell> {
        self.cells.read().await.get(&id).cloned()
    }

    pub async fn number_exists(&self, number: &AccountNumber) -> bool {
        self.numbers.read().await.contains_key(number.as_str())
    }

    /// Allocate the next account id.
    pub fn allocate_id(&self) -> AccountId {
        AccountId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Register an account. Uniqueness of id and number is the caller's
    /// responsibility (provisioning serializes on the journal lock; recovery
    /// checks while replaying).
    pub async fn insert(&self, account: Account) {
        let id = account.id;
        self.numbers
            .write()
            .await
            .insert(account.number.as_str().to_string(), id);
        self.cells
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(account)));

        // Keep the id allocator ahead of everything replayed from the journal
        let floor = id.value() + 1;
        self.next_id.fetch_max(floor, Ordering::SeqCst);
    }

    /// Snapshot every account, sorted by id. Briefly locks each cell.
    pub async fn snapshot(&self) -> Vec<Account> {
        let cells: Vec<AccountCell> = self.cells.read().await.values().cloned().collect();
        let mut accounts = Vec::with_capacity(cells.len());
        for cell in cells {
            accounts.push(cell.lock().await.clone());
        }
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    pub async fn len(&self) -> usize {
        self.cells.read().await.len()
    }
}
