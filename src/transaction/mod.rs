//! Transaction management for isolab.
//!
//! Each withdrawal runs inside its own transaction context. Pending writes
//! live in the context's private set and in a shared journal; commit
//! publishes them to the account store as one indivisible batch. The
//! isolation level decides whether a reader may consult the journal (READ
//! UNCOMMITTED) or only the store (READ COMMITTED) — that one gate is the
//! whole difference between the dirty-read and dirty-read-free scenarios.
//!
//! # Usage
//!
//! ```ignore
//! use isolab::transaction::{TransactionManager, IsolationLevel};
//!
//! let manager = TransactionManager::new(store);
//!
//! let mut tx = manager.begin_with_isolation(IsolationLevel::ReadCommitted);
//! let balance = tx.read(&account)?;
//! tx.write(&account, balance - 50)?;
//! manager.commit_transaction(tx)?;
//! ```

mod context;
mod error;
mod isolation;
mod journal;
mod manager;

pub use context::{Transaction, TransactionMetadata, TxAborted, TxActive, TxCommitted};
pub use error::{TransactionError, TransactionResult};
pub use isolation::IsolationLevel;
pub use journal::WriteJournal;
pub use manager::TransactionManager;
