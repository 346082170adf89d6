//! Wallet Ledger Library
//! # Overview
//!
//! This library implements a digital wallet ledger: accounts hold balances,
//! move funds between each other, and can undo prior movements, with every
//! change recorded as an append-only transaction log.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Transaction, errors, history views)
//! - [`core`] - Business logic components:
//!   - [`core::database`] - In-memory backing store with atomic mutation units
//!   - [`core::engine`] - Ledger operation orchestration
//!   - [`core::account_store`] - Account lookup and balance mutations
//!   - [`core::transaction_store`] - Transaction log access and history joins
//! - [`strategy`] - Per-kind reversal policies
//! - [`auth`] - Registration and login over hashed passwords
//! - [`audit`] - Structured audit events for operations and security denials
//!
//! # Transaction Types
//!
//! The ledger records three transaction kinds:
//!
//! - **Deposit**: Credit funds to an account from outside the system
//! - **Transfer**: Move funds from one account to another
//! - **Reversal**: Undo a prior deposit or transfer, referencing it
//!
//! A reversed transaction stays in the log with status `REVERSED`; the
//! reversal itself is a new entry and can never be reversed again.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rust_decimal::Decimal;
//! use wallet_ledger::audit::TracingAudit;
//! use wallet_ledger::core::{Database, LedgerEngine};
//!
//! let engine = LedgerEngine::new(Arc::new(Database::new()), Arc::new(TracingAudit));
//!
//! let ada = engine.accounts().create("Ada", "ada@example.com", "<hash>").unwrap();
//! engine.accounts().create("Bob", "bob@example.com", "<hash>").unwrap();
//!
//! engine.deposit(ada.id, Decimal::new(10_00, 2)).unwrap();
//! let transfer = engine.transfer(ada.id, "bob@example.com", Decimal::new(4_00, 2)).unwrap();
//! engine.reverse(transfer.id, ada.id).unwrap();
//!
//! assert_eq!(engine.accounts().get(ada.id).unwrap().balance, Decimal::new(10_00, 2));
//! ```

pub mod audit;
pub mod auth;
pub mod core;
pub mod strategy;
pub mod types;

pub use crate::core::{Database, LedgerEngine};
pub use crate::types::LedgerError;
