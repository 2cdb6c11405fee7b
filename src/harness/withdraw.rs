//! The withdrawal operation.
//!
//! One withdrawal is a read-modify-delay-commit sequence inside a single
//! transaction context. The delay between the write and the commit is the
//! window the whole demo revolves around: it models the gap between a
//! database write and its commit, during which a READ UNCOMMITTED reader can
//! observe the tentative balance.

use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::account::AccountId;
use crate::transaction::{IsolationLevel, TransactionManager, TransactionResult};

/// What one completed withdrawal observed and wrote.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalOutcome {
    /// Transaction id the operation ran under.
    pub tx_id: String,
    /// Worker label, mirrored in the log lines.
    pub worker: String,
    /// Amount withdrawn.
    pub amount: i64,
    /// Balance observed by the initial read.
    pub observed: i64,
    /// Balance written back (observed - amount, no floor check).
    pub written: i64,
}

/// Run one withdrawal against `id` inside a fresh transaction.
///
/// Sequence: read, log, subtract, write, log, hold for `commit_delay`,
/// commit. There is deliberately no insufficient-funds check: a dirty read
/// followed by a second withdrawal is how the negative-balance artifact of
/// the demo comes about.
///
/// A missing account rolls the transaction back and returns
/// `AccountNotFound` with no state mutated.
///
/// `read_gate` is the harness's tool for the no-stagger scenarios: both
/// workers rendezvous right after their initial read, so each read completes
/// before either write lands. A real database gets that overlap for free
/// from round-trip latency; an in-memory store needs it spelled out.
pub fn withdraw(
    manager: &TransactionManager,
    id: &AccountId,
    amount: i64,
    isolation: IsolationLevel,
    commit_delay: Duration,
    read_gate: Option<&Barrier>,
    worker: &str,
) -> TransactionResult<WithdrawalOutcome> {
    let mut tx = manager.begin_with_isolation(isolation);

    let read_result = tx.read(id);
    // Every worker passes the gate exactly once, error or not, so a failed
    // read never strands the sibling at the rendezvous.
    if let Some(gate) = read_gate {
        gate.wait();
    }

    let observed = match read_result {
        Ok(balance) => balance,
        Err(e) => {
            manager.rollback_transaction(tx);
            return Err(e);
        }
    };
    log::info!("{} current balance: {}", worker, observed);

    let written = observed - amount;
    if let Err(e) = tx.write(id, written) {
        manager.rollback_transaction(tx);
        return Err(e);
    }
    log::info!("{} balance after withdrawal: {}", worker, written);

    // The write-to-commit gap; dirty reads are only possible in this window.
    thread::sleep(commit_delay);

    let tx_id = tx.id().to_string();
    manager.commit_transaction(tx)?;

    Ok(WithdrawalOutcome {
        tx_id,
        worker: worker.to_string(),
        amount,
        observed,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountStore;
    use crate::transaction::TransactionError;

    fn setup() -> (TransactionManager, AccountId) {
        let store = AccountStore::new();
        let id = store.open(100);
        (TransactionManager::new(store), id)
    }

    #[test]
    fn test_withdraw_commits_new_balance() {
        let (manager, id) = setup();

        let outcome = withdraw(
            &manager,
            &id,
            70,
            IsolationLevel::ReadCommitted,
            Duration::ZERO,
            None,
            "worker-1",
        )
        .unwrap();

        assert_eq!(outcome.observed, 100);
        assert_eq!(outcome.written, 30);
        assert_eq!(manager.store().get(&id).unwrap(), 30);
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_withdraw_may_go_negative() {
        let (manager, id) = setup();

        let outcome = withdraw(
            &manager,
            &id,
            150,
            IsolationLevel::ReadCommitted,
            Duration::ZERO,
            None,
            "worker-1",
        )
        .unwrap();

        assert_eq!(outcome.written, -50);
        assert_eq!(manager.store().get(&id).unwrap(), -50);
    }

    #[test]
    fn test_withdraw_unknown_account() {
        let (manager, _id) = setup();
        let ghost = AccountId::new("ghost").unwrap();

        let err = withdraw(
            &manager,
            &ghost,
            50,
            IsolationLevel::ReadCommitted,
            Duration::ZERO,
            None,
            "worker-1",
        )
        .unwrap_err();

        assert!(matches!(err, TransactionError::AccountNotFound(_)));
        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.store().len(), 1);
    }
}
