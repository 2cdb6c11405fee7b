//! High-level Bank API.
//!
//! Thin plumbing over the store, transaction manager, and harness; this is
//! the surface the demo driver talks to.

mod api;

pub use api::{Bank, BankConfig, BankError, BankResult};
