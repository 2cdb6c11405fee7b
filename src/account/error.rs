//! Error types for the account store.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur at the account store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No record exists for the referenced account.
    #[error("account not found: {0}")]
    NotFound(String),

    /// An account with this id already exists.
    #[error("account already exists: {0}")]
    AlreadyExists(String),
}

/// Validation failures when constructing an [`crate::account::AccountId`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidNameError {
    #[error("account id cannot be empty")]
    Empty,

    #[error("account id too long: {0} characters (max 64)")]
    TooLong(usize),

    #[error("account id cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character '{char}' at position {position}")]
    InvalidCharacter { char: char, position: usize },
}
