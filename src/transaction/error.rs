//! Transaction error types.

use thiserror::Error;

use crate::account::StoreError;

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;

/// Errors that can occur during transaction operations.
#[derive(Debug, Clone, Error)]
pub enum TransactionError {
    /// The referenced account has no record.
    ///
    /// Aborts the operation that triggered it; a sibling transaction running
    /// against a valid account is unaffected.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// Store layer error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Transaction was already committed or aborted.
    #[error("transaction {tx_id} is no longer active (state: {state})")]
    NotActive { tx_id: String, state: String },

    /// Internal error.
    #[error("internal transaction error: {0}")]
    Internal(String),
}

impl TransactionError {
    /// Check whether this error names a missing account.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TransactionError::AccountNotFound(_)
                | TransactionError::Store(StoreError::NotFound(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(TransactionError::AccountNotFound("x".into()).is_not_found());
        assert!(TransactionError::Store(StoreError::NotFound("x".into())).is_not_found());
        assert!(!TransactionError::Internal("boom".into()).is_not_found());
    }
}
