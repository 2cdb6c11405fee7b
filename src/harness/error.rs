//! Harness error types.

use thiserror::Error;

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while driving a pair of withdrawals.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The bounded join elapsed before both operations finished.
    ///
    /// Operations still in flight keep running detached and commit on their
    /// own; the harness does not roll them back.
    #[error("harness timed out: {completed}/{expected} operations finished")]
    Timeout { completed: usize, expected: usize },

    /// A worker thread could not be spawned.
    #[error("worker thread spawn failed: {0}")]
    Spawn(#[from] std::io::Error),
}
