//! Core ledger components
//!
//! - [`Database`]: in-memory backing store with atomic multi-mutation units
//! - [`AccountStore`] / [`TransactionStore`]: typed views over the store
//! - [`LedgerEngine`]: orchestrates deposits, transfers, reversals, history

pub mod account_store;
pub mod database;
pub mod engine;
pub mod transaction_store;

pub use account_store::AccountStore;
pub use database::{CommitReceipt, Database, Mutation};
pub use engine::{DepositReceipt, LedgerEngine};
pub use transaction_store::TransactionStore;
