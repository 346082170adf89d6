//! Transfer reversal strategy
//!
//! Undoing a transfer moves the amount back from the original receiver to
//! the original sender. There is no pre-flight validation: the commit-time
//! balance guard already rejects the unit if the receiver has since spent
//! the funds, and the engine has already checked status, kind, and
//! authorization.

use crate::core::database::Mutation;
use crate::types::{LedgerError, NewTransaction, Transaction, TransactionKind, TransactionStatus};

/// Policy for undoing a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReversal;

impl TransferReversal {
    /// Mutations: credit the sender, debit the receiver, mark the original
    /// reversed, append the reversal entry
    ///
    /// The reversal entry is oriented along the refund: the original
    /// receiver is its `from_account` and the original sender its
    /// `to_account`, so the credited party can be read off the row itself.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the transfer row has no sender, which a
    /// well-formed log never contains.
    pub fn mutations(&self, original: &Transaction) -> Result<Vec<Mutation>, LedgerError> {
        let sender = original.from_account.ok_or_else(|| {
            LedgerError::storage(format!("transfer {} has no sending account", original.id))
        })?;

        Ok(vec![
            Mutation::AdjustBalance {
                account: sender,
                delta: original.amount,
            },
            Mutation::AdjustBalance {
                account: original.to_account,
                delta: -original.amount,
            },
            Mutation::SetStatus {
                transaction: original.id,
                status: TransactionStatus::Reversed,
            },
            Mutation::InsertTransaction(NewTransaction {
                kind: TransactionKind::Reversal,
                amount: original.amount,
                from_account: Some(original.to_account),
                to_account: sender,
                reverses: Some(original.id),
            }),
        ])
    }
}
