//! The committed-balance store.
//!
//! `AccountStore` holds the single authoritative balance per account. It
//! never sees tentative values: transactions keep those in their own pending
//! sets until commit, at which point [`AccountStore::apply`] publishes the
//! whole batch under one write guard. Reads that should respect isolation go
//! through a transaction context, not directly through this store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::account::error::{StoreError, StoreResult};
use crate::account::types::{Account, AccountId};

/// In-memory store of committed account balances.
///
/// Thread-safe: can be shared across threads via Clone (uses Arc internally).
#[derive(Clone, Default)]
pub struct AccountStore {
    inner: Arc<RwLock<HashMap<AccountId, i64>>>,
}

impl AccountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh account with a generated id and the given starting balance.
    pub fn open(&self, initial_balance: i64) -> AccountId {
        let id = AccountId::generate();
        self.inner.write().insert(id.clone(), initial_balance);
        id
    }

    /// Insert an account record with an explicit id.
    pub fn insert(&self, account: Account) -> StoreResult<()> {
        let mut accounts = self.inner.write();
        if accounts.contains_key(&account.id) {
            return Err(StoreError::AlreadyExists(account.id.into_string()));
        }
        accounts.insert(account.id, account.balance);
        Ok(())
    }

    /// Read the committed balance of an account.
    pub fn get(&self, id: &AccountId) -> StoreResult<i64> {
        self.inner
            .read()
            .get(id)
            .copied()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Overwrite the committed balance of an existing account.
    pub fn set(&self, id: &AccountId, balance: i64) -> StoreResult<()> {
        let mut accounts = self.inner.write();
        match accounts.get_mut(id) {
            Some(slot) => {
                *slot = balance;
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Publish a batch of writes as one indivisible update.
    ///
    /// Every id is validated before anything is written, so a missing account
    /// fails the whole batch and leaves the store untouched. This is the
    /// commit point: concurrent readers see either none or all of the batch.
    pub fn apply(&self, writes: &HashMap<AccountId, i64>) -> StoreResult<()> {
        let mut accounts = self.inner.write();

        for id in writes.keys() {
            if !accounts.contains_key(id) {
                return Err(StoreError::NotFound(id.to_string()));
            }
        }

        for (id, balance) in writes {
            accounts.insert(id.clone(), *balance);
        }

        Ok(())
    }

    /// Check whether an account exists.
    pub fn contains(&self, id: &AccountId) -> bool {
        self.inner.read().contains_key(id)
    }

    /// Number of accounts in the store.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl std::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore")
            .field("accounts", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (AccountStore, AccountId) {
        let store = AccountStore::new();
        let id = store.open(100);
        (store, id)
    }

    #[test]
    fn test_open_and_get() {
        let (store, id) = setup();
        assert_eq!(store.get(&id).unwrap(), 100);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_existing() {
        let (store, id) = setup();
        store.set(&id, 30).unwrap();
        assert_eq!(store.get(&id).unwrap(), 30);
    }

    #[test]
    fn test_get_missing() {
        let store = AccountStore::new();
        let id = AccountId::new("ghost").unwrap();
        assert!(matches!(store.get(&id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_set_missing_leaves_store_unmodified() {
        let (store, id) = setup();
        let ghost = AccountId::new("ghost").unwrap();
        assert!(store.set(&ghost, 5).is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap(), 100);
    }

    #[test]
    fn test_insert_duplicate() {
        let (store, id) = setup();
        let dup = Account::new(id, 0);
        assert!(matches!(
            store.insert(dup),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_apply_batch() {
        let store = AccountStore::new();
        let a = store.open(100);
        let b = store.open(200);

        let mut writes = HashMap::new();
        writes.insert(a.clone(), 50);
        writes.insert(b.clone(), 130);
        store.apply(&writes).unwrap();

        assert_eq!(store.get(&a).unwrap(), 50);
        assert_eq!(store.get(&b).unwrap(), 130);
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let store = AccountStore::new();
        let a = store.open(100);
        let ghost = AccountId::new("ghost").unwrap();

        let mut writes = HashMap::new();
        writes.insert(a.clone(), 50);
        writes.insert(ghost, 5);

        assert!(store.apply(&writes).is_err());
        // The valid entry must not have landed either.
        assert_eq!(store.get(&a).unwrap(), 100);
    }
}
