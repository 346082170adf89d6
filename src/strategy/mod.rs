//! Reversal strategy dispatch
//!
//! A reversal undoes a prior transaction; how it does so depends on the
//! kind of transaction being reversed. This module maps a transaction's
//! recorded kind to the policy that knows how to undo it. The set of kinds
//! is closed, so dispatch is an enum rather than an open plugin seam:
//! adding a transaction kind means adding one variant and one match arm.
//!
//! Each strategy exposes an optional pre-flight validation and a mandatory
//! builder for the ordered mutation list the ledger engine commits as one
//! atomic unit. The engine runs validation (when present) first and aborts
//! the reversal on failure.

use crate::core::account_store::AccountStore;
use crate::core::database::Mutation;
use crate::types::{LedgerError, Transaction, TransactionKind};

pub mod deposit;
pub mod transfer;

pub use deposit::DepositReversal;
pub use transfer::TransferReversal;

/// Pre-flight validation hook run before a reversal's mutations are built
pub type ValidateFn = fn(&Transaction, &AccountStore) -> Result<(), LedgerError>;

/// The policy for undoing one kind of transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReversalStrategy {
    /// Undo a deposit by taking the funds back from the recipient
    Deposit(DepositReversal),
    /// Undo a transfer by moving the funds back to the sender
    Transfer(TransferReversal),
}

impl ReversalStrategy {
    /// Select the strategy for the given transaction
    ///
    /// # Panics
    ///
    /// Panics if asked to resolve a strategy for a `Reversal` entry. The
    /// engine rejects reversal-of-a-reversal before resolution, so reaching
    /// that arm is a programming error, not a client error.
    pub fn resolve(transaction: &Transaction) -> Self {
        match transaction.kind {
            TransactionKind::Deposit => ReversalStrategy::Deposit(DepositReversal),
            TransactionKind::Transfer => ReversalStrategy::Transfer(TransferReversal),
            TransactionKind::Reversal => {
                unreachable!("reversal entries are rejected before strategy resolution")
            }
        }
    }

    /// The strategy's pre-flight validation, if it has one
    ///
    /// Deposit reversals must confirm the recipient still holds the funds;
    /// transfer reversals have no check beyond what the engine and the
    /// commit-time balance guard already enforce.
    pub fn validation(&self) -> Option<ValidateFn> {
        match self {
            ReversalStrategy::Deposit(_) => Some(DepositReversal::validate),
            ReversalStrategy::Transfer(_) => None,
        }
    }

    /// Build the ordered mutation list that undoes the original transaction
    ///
    /// The list always debits/credits the affected balances, marks the
    /// original entry `Reversed`, and appends a new `Reversal` entry
    /// referencing it.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the original row is malformed for its
    /// kind (a transfer with no sender).
    pub fn mutations(&self, original: &Transaction) -> Result<Vec<Mutation>, LedgerError> {
        match self {
            ReversalStrategy::Deposit(strategy) => Ok(strategy.mutations(original)),
            ReversalStrategy::Transfer(strategy) => strategy.mutations(original),
        }
    }
}
