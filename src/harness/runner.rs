//! Concurrency harness: runs two withdrawals against one account.
//!
//! The harness spawns a fixed pair of worker threads and joins both against
//! a deadline. Submission order does not guarantee execution order; the two
//! timing tools are the stagger, which sends the second worker into the
//! first's write-to-commit window (the dirty-read scenarios), and a read
//! rendezvous for unstaggered pairs, which lets both initial reads land on
//! the same committed balance (the lost-update scenarios).

use std::fmt;
use std::str::FromStr;
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use crate::account::AccountId;
use crate::harness::error::{HarnessError, HarnessResult};
use crate::harness::withdraw::{withdraw, WithdrawalOutcome};
use crate::transaction::{IsolationLevel, TransactionError, TransactionManager};

/// Result of one slot of the pair.
pub type OperationResult = Result<WithdrawalOutcome, TransactionError>;

/// Timing configuration for the harness.
///
/// Defaults: a one second write-to-commit gap, no stagger, and a ten second
/// bounded join. Tests shrink these to keep the suite fast without racing
/// the wall clock.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Pause between an operation's write and its commit.
    pub commit_delay: Duration,
    /// Optional pause before submitting the second operation.
    pub stagger: Option<Duration>,
    /// How long the harness waits for both operations to finish.
    pub join_timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            commit_delay: Duration::from_millis(1000),
            stagger: None,
            join_timeout: Duration::from_secs(10),
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the write-to-commit delay.
    pub fn commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = delay;
        self
    }

    /// Stagger the second operation by `delay`.
    pub fn stagger(mut self, delay: Duration) -> Self {
        self.stagger = Some(delay);
        self
    }

    /// Submit both operations back-to-back.
    pub fn no_stagger(mut self) -> Self {
        self.stagger = None;
        self
    }

    /// Set the bounded join timeout.
    pub fn join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }
}

/// The four demonstrated configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Both ops race for the same starting balance; lost update possible.
    ReadUncommittedCommon,
    /// Second op staggered into the first's write-to-commit window; it
    /// observes the uncommitted balance.
    ReadUncommittedDirtyRead,
    /// Same race as the first scenario under READ COMMITTED.
    ReadCommittedCommon,
    /// Same timing as the dirty-read scenario, but the uncommitted balance
    /// stays invisible.
    ReadCommittedDirtyRead,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::ReadUncommittedCommon,
        Scenario::ReadUncommittedDirtyRead,
        Scenario::ReadCommittedCommon,
        Scenario::ReadCommittedDirtyRead,
    ];

    /// Isolation level both operations run under.
    pub fn isolation(&self) -> IsolationLevel {
        match self {
            Scenario::ReadUncommittedCommon | Scenario::ReadUncommittedDirtyRead => {
                IsolationLevel::ReadUncommitted
            }
            Scenario::ReadCommittedCommon | Scenario::ReadCommittedDirtyRead => {
                IsolationLevel::ReadCommitted
            }
        }
    }

    /// Whether the second operation is staggered.
    pub fn staggered(&self) -> bool {
        matches!(
            self,
            Scenario::ReadUncommittedDirtyRead | Scenario::ReadCommittedDirtyRead
        )
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route = match self {
            Scenario::ReadUncommittedCommon => "read-uncommitted/common",
            Scenario::ReadUncommittedDirtyRead => "read-uncommitted/dirty-read",
            Scenario::ReadCommittedCommon => "read-committed/common",
            Scenario::ReadCommittedDirtyRead => "read-committed/dirty-read",
        };
        write!(f, "{}", route)
    }
}

/// Parse a scenario from its route spelling.
impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_matches('/').to_lowercase().as_str() {
            "read-uncommitted/common" => Ok(Scenario::ReadUncommittedCommon),
            "read-uncommitted/dirty-read" => Ok(Scenario::ReadUncommittedDirtyRead),
            "read-committed/common" => Ok(Scenario::ReadCommittedCommon),
            "read-committed/dirty-read" => Ok(Scenario::ReadCommittedDirtyRead),
            _ => Err(format!("unknown scenario: {}", s)),
        }
    }
}

/// Runs pairs of withdrawals concurrently with a bounded join.
///
/// An explicitly passed instance rather than ambient pool state, so tests
/// stay isolated from each other.
#[derive(Debug, Clone)]
pub struct Harness {
    manager: TransactionManager,
    config: HarnessConfig,
}

impl Harness {
    pub fn new(manager: TransactionManager, config: HarnessConfig) -> Self {
        Self { manager, config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run two withdrawals of `amounts` against `id` under `isolation`.
    ///
    /// Per-operation failures (a missing account, say) land in that slot's
    /// result and never abort the sibling. If the bounded join elapses first
    /// the harness returns [`HarnessError::Timeout`] and abandons the
    /// in-flight operations; they keep running detached and commit on their
    /// own, with no rollback. That is a known limitation, not an oversight.
    pub fn run_pair(
        &self,
        id: &AccountId,
        amounts: (i64, i64),
        isolation: IsolationLevel,
    ) -> HarnessResult<[OperationResult; 2]> {
        let (sender, receiver) = mpsc::channel();

        // Without a stagger both workers rendezvous after their initial
        // reads, so each read observes the same committed balance before
        // either write lands. A staggered pair skips the rendezvous: the
        // second worker is meant to arrive mid-flight.
        let read_gate = if self.config.stagger.is_none() {
            Some(Arc::new(Barrier::new(2)))
        } else {
            None
        };

        self.spawn_worker(0, id, amounts.0, isolation, read_gate.clone(), sender.clone())?;
        if let Some(stagger) = self.config.stagger {
            thread::sleep(stagger);
        }
        self.spawn_worker(1, id, amounts.1, isolation, read_gate, sender)?;

        let deadline = Instant::now() + self.config.join_timeout;
        let mut slots: [Option<OperationResult>; 2] = [None, None];
        let mut completed = 0usize;

        while completed < 2 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match receiver.recv_timeout(remaining) {
                Ok((slot, result)) => {
                    slots[slot] = Some(result);
                    completed += 1;
                }
                Err(_) => {
                    log::warn!(
                        "harness abandoning pair: {}/2 operations finished",
                        completed
                    );
                    return Err(HarnessError::Timeout {
                        completed,
                        expected: 2,
                    });
                }
            }
        }

        let [first, second] = slots;
        // Both slots are filled once completed == 2.
        match (first, second) {
            (Some(a), Some(b)) => Ok([a, b]),
            _ => unreachable!("join loop exited with an empty slot"),
        }
    }

    /// Run a named scenario with the given withdrawal amounts.
    pub fn run_scenario(
        &self,
        id: &AccountId,
        scenario: Scenario,
        amounts: (i64, i64),
    ) -> HarnessResult<[OperationResult; 2]> {
        let harness = if scenario.staggered() {
            let stagger = self
                .config
                .stagger
                .unwrap_or(Duration::from_millis(100));
            Self::new(self.manager.clone(), self.config.clone().stagger(stagger))
        } else {
            Self::new(self.manager.clone(), self.config.clone().no_stagger())
        };

        log::info!(
            "running scenario {} ({})",
            scenario,
            scenario.isolation().description()
        );
        harness.run_pair(id, amounts, scenario.isolation())
    }

    fn spawn_worker(
        &self,
        slot: usize,
        id: &AccountId,
        amount: i64,
        isolation: IsolationLevel,
        read_gate: Option<Arc<Barrier>>,
        sender: mpsc::Sender<(usize, OperationResult)>,
    ) -> HarnessResult<()> {
        let manager = self.manager.clone();
        let id = id.clone();
        let commit_delay = self.config.commit_delay;
        let label = format!("worker-{}", slot + 1);

        thread::Builder::new().name(label.clone()).spawn(move || {
            let result = withdraw(
                &manager,
                &id,
                amount,
                isolation,
                commit_delay,
                read_gate.as_deref(),
                &label,
            );
            // The receiver may be gone if the harness already timed out;
            // the operation itself has still committed or failed on its own.
            let _ = sender.send((slot, result));
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountStore;

    fn setup(config: HarnessConfig) -> (Harness, AccountStore, AccountId) {
        let store = AccountStore::new();
        let id = store.open(100);
        let harness = Harness::new(TransactionManager::new(store.clone()), config);
        (harness, store, id)
    }

    fn fast() -> HarnessConfig {
        HarnessConfig::new()
            .commit_delay(Duration::from_millis(300))
            .join_timeout(Duration::from_secs(5))
    }

    #[test]
    fn test_scenario_routes_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.to_string().parse::<Scenario>().unwrap(), scenario);
        }
        assert!("read-uncommitted/phantom".parse::<Scenario>().is_err());
    }

    #[test]
    fn test_scenario_shape() {
        assert!(Scenario::ReadUncommittedDirtyRead.staggered());
        assert!(!Scenario::ReadCommittedCommon.staggered());
        assert_eq!(
            Scenario::ReadCommittedDirtyRead.isolation(),
            IsolationLevel::ReadCommitted
        );
    }

    // Both workers race for the starting balance; one update is lost but the
    // final balance is always a single committed withdrawal, never both.
    #[test]
    fn test_common_race_loses_one_update() {
        for isolation in [IsolationLevel::ReadUncommitted, IsolationLevel::ReadCommitted] {
            let (harness, store, id) = setup(fast());
            let outcomes = harness.run_pair(&id, (50, 70), isolation).unwrap();

            for outcome in &outcomes {
                outcome.as_ref().unwrap();
            }
            let final_balance = store.get(&id).unwrap();
            assert!(
                final_balance == 50 || final_balance == 30,
                "expected a lost update, got {}",
                final_balance
            );
        }
    }

    // The staggered reader under READ UNCOMMITTED observes the first
    // worker's uncommitted 50 and drives the balance to -20.
    #[test]
    fn test_dirty_read_produces_negative_balance() {
        let (harness, store, id) =
            setup(fast().stagger(Duration::from_millis(100)));

        let outcomes = harness
            .run_pair(&id, (50, 70), IsolationLevel::ReadUncommitted)
            .unwrap();

        let first = outcomes[0].as_ref().unwrap();
        let second = outcomes[1].as_ref().unwrap();
        assert_eq!(first.observed, 100);
        assert_eq!(second.observed, 50, "second op should dirty-read the pending 50");
        assert_eq!(second.written, -20);
        assert_eq!(store.get(&id).unwrap(), -20);
    }

    // Same timing under READ COMMITTED: the uncommitted 50 stays invisible.
    #[test]
    fn test_read_committed_prevents_dirty_read() {
        let (harness, store, id) =
            setup(fast().stagger(Duration::from_millis(100)));

        let outcomes = harness
            .run_pair(&id, (50, 70), IsolationLevel::ReadCommitted)
            .unwrap();

        let second = outcomes[1].as_ref().unwrap();
        assert_eq!(
            second.observed, 100,
            "second op must see the committed balance, not the pending 50"
        );
        assert_eq!(store.get(&id).unwrap(), 30);
    }

    #[test]
    fn test_missing_account_fails_both_slots_without_panic() {
        let (harness, store, id) = setup(fast().commit_delay(Duration::ZERO));
        let ghost = AccountId::new("ghost").unwrap();

        let outcomes = harness
            .run_pair(&ghost, (50, 70), IsolationLevel::ReadCommitted)
            .unwrap();

        for outcome in &outcomes {
            assert!(outcome.as_ref().unwrap_err().is_not_found());
        }
        // The real account is untouched by the failed pair.
        assert_eq!(store.get(&id).unwrap(), 100);
    }

    // A join timeout abandons the pair but the detached operations still
    // run to completion and commit on their own.
    #[test]
    fn test_timeout_leaves_operations_detached() {
        let (harness, store, id) = setup(
            HarnessConfig::new()
                .commit_delay(Duration::from_millis(300))
                .join_timeout(Duration::from_millis(50)),
        );

        let err = harness
            .run_pair(&id, (50, 70), IsolationLevel::ReadCommitted)
            .unwrap_err();
        assert!(matches!(err, HarnessError::Timeout { expected: 2, .. }));

        // Give the detached workers time to finish.
        thread::sleep(Duration::from_millis(600));
        let final_balance = store.get(&id).unwrap();
        assert_ne!(final_balance, 100, "detached operations should still commit");
    }
}
