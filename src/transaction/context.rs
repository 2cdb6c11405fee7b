//! Transaction context using typestate pattern.
//!
//! The typestate pattern ensures at compile time that transactions
//! are used correctly:
//! - Only active transactions can read, write, commit, or roll back
//! - Committed/aborted transactions cannot be reused
//!
//! The context is where the isolation rule lives: every balance read funnels
//! through [`Transaction::read`], which decides between the shared journal of
//! uncommitted writes and the committed store based on the isolation level.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::account::{AccountId, AccountStore};
use crate::transaction::error::{TransactionError, TransactionResult};
use crate::transaction::isolation::IsolationLevel;
use crate::transaction::journal::WriteJournal;

/// Marker type for active transactions.
#[derive(Debug)]
pub struct TxActive;

/// Marker type for committed transactions.
#[derive(Debug)]
pub struct TxCommitted;

/// Marker type for aborted transactions.
#[derive(Debug)]
pub struct TxAborted;

/// Transaction metadata stored in the manager.
#[derive(Debug, Clone)]
pub struct TransactionMetadata {
    /// Unique transaction ID.
    pub tx_id: String,
    /// Isolation level for this transaction.
    pub isolation: IsolationLevel,
    /// When the transaction started.
    pub started_at: chrono::DateTime<chrono::Utc>,
}

/// A transaction over the account store, with typestate for lifecycle safety.
///
/// The `State` parameter tracks whether the transaction is:
/// - `TxActive`: Can perform operations
/// - `TxCommitted`: Successfully committed, no more operations allowed
/// - `TxAborted`: Rolled back, no more operations allowed
pub struct Transaction<State> {
    /// Transaction metadata.
    pub(crate) metadata: TransactionMetadata,
    /// Committed balances.
    pub(crate) store: AccountStore,
    /// Shared journal of uncommitted writes.
    pub(crate) journal: WriteJournal,
    /// This transaction's private pending writes.
    pub(crate) pending: HashMap<AccountId, i64>,
    /// Phantom data for typestate.
    _state: PhantomData<State>,
}

impl<State> Transaction<State> {
    /// Get the transaction ID.
    pub fn id(&self) -> &str {
        &self.metadata.tx_id
    }

    /// Get the isolation level.
    pub fn isolation(&self) -> IsolationLevel {
        self.metadata.isolation
    }

    /// When the transaction started.
    pub fn started_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.metadata.started_at
    }
}

impl Transaction<TxActive> {
    /// Create a new active transaction.
    pub(crate) fn new(
        store: AccountStore,
        journal: WriteJournal,
        tx_id: String,
        isolation: IsolationLevel,
    ) -> Self {
        Self {
            metadata: TransactionMetadata {
                tx_id,
                isolation,
                started_at: chrono::Utc::now(),
            },
            store,
            journal,
            pending: HashMap::new(),
            _state: PhantomData,
        }
    }

    /// Read an account balance under this transaction's isolation level.
    ///
    /// Own pending writes are always visible first. Otherwise:
    /// - READ UNCOMMITTED: the most recent uncommitted write from any live
    ///   transaction, falling back to the committed value.
    /// - READ COMMITTED: the committed value only. Another transaction's
    ///   pending write stays invisible until it commits.
    pub fn read(&self, id: &AccountId) -> TransactionResult<i64> {
        if let Some(value) = self.pending.get(id) {
            return Ok(*value);
        }

        if self.metadata.isolation.permits_dirty_reads() {
            if let Some(value) = self.journal.latest_write(id) {
                return Ok(value);
            }
        }

        self.store
            .get(id)
            .map_err(|_| TransactionError::AccountNotFound(id.to_string()))
    }

    /// Record a tentative balance for `id`.
    ///
    /// The write lands in this transaction's pending set and in the shared
    /// journal; it does not touch the committed store. Writing to an unknown
    /// account fails with `AccountNotFound` and records nothing.
    pub fn write(&mut self, id: &AccountId, value: i64) -> TransactionResult<()> {
        if !self.store.contains(id) {
            return Err(TransactionError::AccountNotFound(id.to_string()));
        }

        self.journal.record(&self.metadata.tx_id, id, value);
        self.pending.insert(id.clone(), value);
        Ok(())
    }

    /// Commit the transaction.
    ///
    /// Publishes all pending writes to the store as one indivisible batch,
    /// then drops the journal entry. Ordering matters: the store is updated
    /// first, so at no point is a committed value visible to neither reader
    /// class.
    pub fn commit(self) -> TransactionResult<Transaction<TxCommitted>> {
        if let Err(e) = self.store.apply(&self.pending) {
            // Failed publish aborts the transaction; discard its writes.
            self.journal.remove(&self.metadata.tx_id);
            return Err(TransactionError::Store(e));
        }

        self.journal.remove(&self.metadata.tx_id);

        Ok(Transaction {
            metadata: self.metadata,
            store: self.store,
            journal: self.journal,
            pending: self.pending,
            _state: PhantomData,
        })
    }

    /// Rollback the transaction, discarding all pending writes.
    pub fn rollback(self) -> Transaction<TxAborted> {
        self.journal.remove(&self.metadata.tx_id);

        Transaction {
            metadata: self.metadata,
            store: self.store,
            journal: self.journal,
            pending: HashMap::new(),
            _state: PhantomData,
        }
    }
}

impl Transaction<TxCommitted> {
    /// The writes this transaction published.
    pub fn published(&self) -> &HashMap<AccountId, i64> {
        &self.pending
    }
}

impl Transaction<TxAborted> {
    pub fn was_rolled_back(&self) -> bool {
        true
    }
}
