//! Account records and the committed-balance store.
//!
//! One mutable balance per account. All isolation-aware reads go through a
//! transaction context (`crate::transaction`); the store itself only ever
//! holds committed values.

mod error;
mod store;
mod types;

pub use error::{InvalidNameError, StoreError, StoreResult};
pub use store::AccountStore;
pub use types::{Account, AccountId};
