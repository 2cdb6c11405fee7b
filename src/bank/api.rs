//! Bank facade - high-level trigger surface for the demo.
//!
//! Four POST-style endpoints keyed by account id collapse here to scenario
//! routing on a `Bank` handle. Calls are fire and forget: the interesting
//! output is the log lines and a follow-up balance read, not a return
//! payload.

use thiserror::Error;

use crate::account::{AccountId, AccountStore, StoreError};
use crate::harness::{Harness, HarnessConfig, HarnessError, OperationResult, Scenario};
use crate::transaction::{TransactionError, TransactionManager};

/// Result type for bank operations.
pub type BankResult<T> = Result<T, BankError>;

/// Bank errors.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("harness error: {0}")]
    Harness(#[from] HarnessError),

    #[error("unknown scenario route: {0}")]
    UnknownScenario(String),
}

/// Bank configuration options.
#[derive(Debug, Clone)]
pub struct BankConfig {
    /// Starting balance for newly opened accounts.
    pub initial_balance: i64,
    /// Withdrawal amounts for the two workers.
    pub amounts: (i64, i64),
    /// Harness timing.
    pub harness: HarnessConfig,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            initial_balance: 100,
            amounts: (50, 70),
            harness: HarnessConfig::default(),
        }
    }
}

impl BankConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the starting balance for new accounts.
    pub fn initial_balance(mut self, balance: i64) -> Self {
        self.initial_balance = balance;
        self
    }

    /// Set the two withdrawal amounts.
    pub fn amounts(mut self, first: i64, second: i64) -> Self {
        self.amounts = (first, second);
        self
    }

    /// Replace the harness timing configuration.
    pub fn harness(mut self, harness: HarnessConfig) -> Self {
        self.harness = harness;
        self
    }
}

/// The main bank handle: one store, one transaction manager, one harness
/// configuration.
pub struct Bank {
    config: BankConfig,
    store: AccountStore,
    manager: TransactionManager,
}

impl Bank {
    /// Create a bank with the given configuration.
    pub fn new(config: BankConfig) -> Self {
        let store = AccountStore::new();
        let manager = TransactionManager::new(store.clone());
        Self {
            config,
            store,
            manager,
        }
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    /// Open a fresh account at the configured starting balance.
    pub fn open_account(&self) -> AccountId {
        self.store.open(self.config.initial_balance)
    }

    /// Open a fresh account at an explicit balance.
    pub fn open_account_with(&self, balance: i64) -> AccountId {
        self.store.open(balance)
    }

    /// Read an account's committed balance.
    pub fn balance(&self, id: &AccountId) -> BankResult<i64> {
        Ok(self.store.get(id)?)
    }

    /// Run a scenario, fire-and-forget: outcomes go to the log, verification
    /// is a follow-up [`Bank::balance`] call.
    pub fn run_scenario(&self, id: &AccountId, scenario: Scenario) -> BankResult<()> {
        self.run_scenario_report(id, scenario).map(|_| ())
    }

    /// Run a scenario and hand back the per-slot outcomes.
    pub fn run_scenario_report(
        &self,
        id: &AccountId,
        scenario: Scenario,
    ) -> BankResult<[OperationResult; 2]> {
        let harness = Harness::new(self.manager.clone(), self.config.harness.clone());
        Ok(harness.run_scenario(id, scenario, self.config.amounts)?)
    }

    /// Route-string entry point (`read-uncommitted/common`,
    /// `read-committed/dirty-read`, ...).
    pub fn run_route(&self, id: &AccountId, route: &str) -> BankResult<()> {
        let scenario: Scenario = route
            .parse()
            .map_err(|_| BankError::UnknownScenario(route.to_string()))?;
        self.run_scenario(id, scenario)
    }
}

impl std::fmt::Debug for Bank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bank")
            .field("accounts", &self.store.len())
            .field("config", &self.config)
            .finish()
    }
}
