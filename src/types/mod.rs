//! Types module
//!
//! Contains core data structures used throughout the ledger.
//! This module organizes types into logical submodules:
//! - `account`: Account state
//! - `transaction`: Ledger entries, kinds, statuses, and identifiers
//! - `history`: Per-account history view types
//! - `error`: Error types and client-visible classification

pub mod account;
pub mod error;
pub mod history;
pub mod transaction;

pub use account::Account;
pub use error::{ErrorClass, LedgerError};
pub use history::{HistoryEntry, HistoryKind, HistoryRow, Party, ReversedRef};
pub use transaction::{
    AccountId, NewTransaction, Transaction, TransactionId, TransactionKind, TransactionStatus,
};
