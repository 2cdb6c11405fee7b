//! isolab - A Bank-Account Isolation Sandbox
//!
//! This crate is a teaching model of how transaction isolation levels shape
//! the anomalies two concurrent withdrawals can produce on a single balance:
//! a lost update under either level, a dirty read under READ UNCOMMITTED,
//! and the absence of that dirty read under READ COMMITTED.
//!
//! # Example
//!
//! ```no_run
//! use isolab::bank::{Bank, BankConfig};
//!
//! let bank = Bank::new(BankConfig::new());
//! let account = bank.open_account();
//! bank.run_route(&account, "read-uncommitted/dirty-read").unwrap();
//! println!("final balance: {}", bank.balance(&account).unwrap());
//! ```

pub mod account;
pub mod bank;
pub mod harness;
pub mod transaction;
