//! Shared registry of uncommitted writes.
//!
//! Every active transaction records its tentative balances here as well as in
//! its private pending set. Readers running at READ UNCOMMITTED consult this
//! journal to observe other transactions' in-flight writes; READ COMMITTED
//! readers never look at it. A transaction's entry is removed when it commits
//! (after its writes have been published to the store) or rolls back, so
//! journal membership is what "uncommitted" means.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::account::AccountId;

/// One tentative balance, stamped with a global write sequence number so the
/// most recent write across all transactions can be identified.
#[derive(Debug, Clone, Copy)]
struct PendingWrite {
    value: i64,
    seq: u64,
}

#[derive(Default)]
struct JournalInner {
    /// Monotonic stamp handed to each write.
    seq: AtomicU64,
    /// Uncommitted writes keyed by transaction id.
    entries: RwLock<HashMap<String, HashMap<AccountId, PendingWrite>>>,
}

/// Journal of uncommitted writes, shared by all transactions of one manager.
///
/// Thread-safe: can be shared across threads via Clone (uses Arc internally).
#[derive(Clone, Default)]
pub struct WriteJournal {
    inner: Arc<JournalInner>,
}

impl WriteJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tentative balance for `id` on behalf of `tx_id`.
    ///
    /// Returns the sequence number stamped on the write.
    pub fn record(&self, tx_id: &str, id: &AccountId, value: i64) -> u64 {
        let seq = self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let mut entries = self.inner.entries.write();
        entries
            .entry(tx_id.to_string())
            .or_default()
            .insert(id.clone(), PendingWrite { value, seq });
        seq
    }

    /// The most recent uncommitted write to `id` across all live
    /// transactions, if any. This is the value a dirty read observes.
    pub fn latest_write(&self, id: &AccountId) -> Option<i64> {
        let entries = self.inner.entries.read();
        entries
            .values()
            .filter_map(|writes| writes.get(id))
            .max_by_key(|w| w.seq)
            .map(|w| w.value)
    }

    /// Drop a transaction's entry (on commit after publish, or on rollback).
    pub fn remove(&self, tx_id: &str) {
        self.inner.entries.write().remove(tx_id);
    }

    /// Whether a transaction currently has uncommitted writes on record.
    pub fn contains(&self, tx_id: &str) -> bool {
        self.inner.entries.read().contains_key(tx_id)
    }

    /// Number of transactions with uncommitted writes.
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }
}

impl std::fmt::Debug for WriteJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteJournal")
            .field("uncommitted_txs", &self.len())
            .finish()
    }
}
