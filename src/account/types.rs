//! Type-safe wrappers for account records.

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::account::error::InvalidNameError;

/// A validated account identifier.
///
/// Account ids show up in log lines and demo routes, so they carry the same
/// restrictions as any path-safe name:
/// - 1-64 characters
/// - Alphanumeric, underscores, hyphens only
/// - Must start with a letter or underscore
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// create a new AccountId, validating the input
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidNameError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Generate a new ULID-based account id.
    pub fn generate() -> Self {
        Self(format!("acct-{}", Ulid::new().to_string().to_lowercase()))
    }

    fn validate(id: &str) -> Result<(), InvalidNameError> {
        if id.is_empty() {
            return Err(InvalidNameError::Empty);
        }

        if id.len() > 64 {
            return Err(InvalidNameError::TooLong(id.len()));
        }

        let first_char = id.chars().next().unwrap();
        if !first_char.is_ascii_alphabetic() && first_char != '_' {
            return Err(InvalidNameError::InvalidStart(first_char));
        }

        for (i, c) in id.chars().enumerate() {
            if !c.is_ascii_alphanumeric() && c != '_' && c != '-' {
                return Err(InvalidNameError::InvalidCharacter { char: c, position: i });
            }
        }

        Ok(())
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// convert to owned String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single account record: id plus committed balance.
///
/// Balances are plain integers and may go negative. The demo depends on
/// that: a dirty read followed by a second withdrawal is exactly how the
/// negative-balance artifact is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: i64,
}

impl Account {
    pub fn new(id: AccountId, balance: i64) -> Self {
        Self { id, balance }
    }
}
