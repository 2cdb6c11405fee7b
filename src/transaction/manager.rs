//! Transaction manager - coordinates all transaction operations.
//!
//! The TransactionManager is the main entry point for transactions.
//! It handles:
//! - Transaction creation and lifecycle
//! - Tracking active transactions
//! - Serializing commits to the store

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use ulid::Ulid;

use crate::account::AccountStore;
use crate::transaction::context::{Transaction, TransactionMetadata, TxActive};
use crate::transaction::error::TransactionResult;
use crate::transaction::isolation::IsolationLevel;
use crate::transaction::journal::WriteJournal;

/// Transaction manager - coordinates all transaction operations.
///
/// Thread-safe: can be shared across threads via Clone (uses Arc internally).
#[derive(Clone)]
pub struct TransactionManager {
    inner: Arc<TransactionManagerInner>,
}

struct TransactionManagerInner {
    /// Committed balances.
    store: AccountStore,
    /// Shared journal of uncommitted writes.
    journal: WriteJournal,
    /// Active transactions tracked by ID.
    active: RwLock<HashMap<String, TransactionMetadata>>,
    /// Mutex for serializing commits to the store.
    commit_lock: Mutex<()>,
}

impl TransactionManager {
    /// Create a new transaction manager over the given store.
    pub fn new(store: AccountStore) -> Self {
        Self {
            inner: Arc::new(TransactionManagerInner {
                store,
                journal: WriteJournal::new(),
                active: RwLock::new(HashMap::new()),
                commit_lock: Mutex::new(()),
            }),
        }
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &AccountStore {
        &self.inner.store
    }

    /// Begin a new transaction with the default isolation level.
    pub fn begin(&self) -> Transaction<TxActive> {
        self.begin_with_isolation(IsolationLevel::default())
    }

    /// Begin a new transaction with a specific isolation level.
    pub fn begin_with_isolation(&self, isolation: IsolationLevel) -> Transaction<TxActive> {
        let tx_id = format!("tx-{}", Ulid::new().to_string().to_lowercase());

        let tx = Transaction::new(
            self.inner.store.clone(),
            self.inner.journal.clone(),
            tx_id.clone(),
            isolation,
        );

        {
            let mut active = self.inner.active.write();
            active.insert(tx_id, tx.metadata.clone());
        }

        tx
    }

    /// Get the number of active transactions.
    pub fn active_count(&self) -> usize {
        self.inner.active.read().len()
    }

    /// Check if a transaction is active.
    pub fn is_active(&self, tx_id: &str) -> bool {
        self.inner.active.read().contains_key(tx_id)
    }

    /// Get metadata for an active transaction.
    pub fn get_transaction_info(&self, tx_id: &str) -> Option<TransactionMetadata> {
        self.inner.active.read().get(tx_id).cloned()
    }

    /// Mark a transaction as completed (committed or aborted).
    pub(crate) fn mark_completed(&self, tx_id: &str) {
        self.inner.active.write().remove(tx_id);
    }

    /// Commit a transaction with serialization.
    ///
    /// Acquires a lock so only one transaction publishes at a time; the
    /// store's own write guard makes each batch indivisible, the commit lock
    /// keeps whole commits from interleaving.
    pub fn commit_transaction(&self, tx: Transaction<TxActive>) -> TransactionResult<()> {
        let _guard = self.inner.commit_lock.lock();

        let tx_id = tx.id().to_string();
        let result = tx.commit();
        self.mark_completed(&tx_id);

        result.map(|_| ())
    }

    /// Rollback a transaction, discarding its pending writes.
    pub fn rollback_transaction(&self, tx: Transaction<TxActive>) {
        let tx_id = tx.id().to_string();
        tx.rollback();
        self.mark_completed(&tx_id);
    }

    /// Execute a function within a transaction, automatically committing or
    /// rolling back.
    ///
    /// If the function returns Ok, the transaction is committed.
    /// If the function returns Err, the transaction is rolled back.
    pub fn with_transaction<F, T>(&self, f: F) -> TransactionResult<T>
    where
        F: FnOnce(&mut Transaction<TxActive>) -> TransactionResult<T>,
    {
        self.with_transaction_isolation(IsolationLevel::default(), f)
    }

    /// Execute a function within a transaction with a specific isolation level.
    pub fn with_transaction_isolation<F, T>(
        &self,
        isolation: IsolationLevel,
        f: F,
    ) -> TransactionResult<T>
    where
        F: FnOnce(&mut Transaction<TxActive>) -> TransactionResult<T>,
    {
        let mut tx = self.begin_with_isolation(isolation);

        match f(&mut tx) {
            Ok(result) => {
                self.commit_transaction(tx)?;
                Ok(result)
            }
            Err(e) => {
                self.rollback_transaction(tx);
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("active_count", &self.active_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountId;
    use crate::transaction::error::TransactionError;

    fn setup() -> (TransactionManager, AccountId) {
        let store = AccountStore::new();
        let id = store.open(100);
        (TransactionManager::new(store), id)
    }

    #[test]
    fn test_begin_and_commit() {
        let (manager, id) = setup();

        let mut tx = manager.begin();
        assert!(manager.is_active(tx.id()));

        let balance = tx.read(&id).unwrap();
        tx.write(&id, balance - 50).unwrap();

        manager.commit_transaction(tx).unwrap();
        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.store().get(&id).unwrap(), 50);
    }

    #[test]
    fn test_begin_and_rollback() {
        let (manager, id) = setup();

        let mut tx = manager.begin();
        tx.write(&id, 0).unwrap();

        manager.rollback_transaction(tx);
        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.store().get(&id).unwrap(), 100);
    }

    #[test]
    fn test_with_transaction() {
        let (manager, id) = setup();

        let observed = manager
            .with_transaction(|tx| {
                let balance = tx.read(&id)?;
                tx.write(&id, balance - 70)?;
                Ok(balance)
            })
            .unwrap();

        assert_eq!(observed, 100);
        assert_eq!(manager.store().get(&id).unwrap(), 30);
    }

    #[test]
    fn test_with_transaction_rollback_on_error() {
        let (manager, id) = setup();

        let result: TransactionResult<()> = manager.with_transaction(|tx| {
            tx.write(&id, 0)?;
            Err(TransactionError::Internal("test error".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(manager.store().get(&id).unwrap(), 100);
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_active_transactions() {
        let (manager, _id) = setup();

        assert_eq!(manager.active_count(), 0);

        let tx1 = manager.begin();
        assert_eq!(manager.active_count(), 1);
        assert!(manager.get_transaction_info(tx1.id()).is_some());

        let tx2 = manager.begin_with_isolation(IsolationLevel::ReadUncommitted);
        assert_eq!(manager.active_count(), 2);
        assert_eq!(
            manager.get_transaction_info(tx2.id()).unwrap().isolation,
            IsolationLevel::ReadUncommitted
        );

        manager.rollback_transaction(tx1);
        manager.rollback_transaction(tx2);
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_tx_ids_are_unique() {
        let (manager, _id) = setup();
        let tx1 = manager.begin();
        let tx2 = manager.begin();
        assert_ne!(tx1.id(), tx2.id());
        manager.rollback_transaction(tx1);
        manager.rollback_transaction(tx2);
    }
}
