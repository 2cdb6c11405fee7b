//! Withdrawal operation and the two-worker concurrency harness.
//!
//! `withdraw` is the read-modify-delay-commit sequence; `Harness` runs two
//! of them against the same account, optionally staggering the second into
//! the first's write-to-commit window. The four [`Scenario`] values are the
//! canonical configurations of the demo.

mod error;
mod runner;
mod withdraw;

pub use error::{HarnessError, HarnessResult};
pub use runner::{Harness, HarnessConfig, OperationResult, Scenario};
pub use withdraw::{withdraw, WithdrawalOutcome};
