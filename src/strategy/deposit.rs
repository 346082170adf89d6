//! Deposit reversal strategy
//!
//! Undoing a deposit takes the deposited amount back from the recipient.
//! The recipient may have spent or transferred the funds away since, so the
//! strategy pre-validates that their current balance still covers the
//! deposit before any mutation is built.

use crate::core::account_store::AccountStore;
use crate::core::database::Mutation;
use crate::types::{LedgerError, NewTransaction, Transaction, TransactionKind, TransactionStatus};

/// Policy for undoing a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositReversal;

impl DepositReversal {
    /// Pre-flight check: the recipient must still hold at least the
    /// deposited amount
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` if the funds have since been spent,
    /// or `AccountNotFound` if the recipient no longer resolves.
    pub fn validate(original: &Transaction, accounts: &AccountStore) -> Result<(), LedgerError> {
        let recipient = accounts.get(original.to_account)?;

        if recipient.balance < original.amount {
            return Err(LedgerError::insufficient_balance(
                recipient.id,
                recipient.balance,
                original.amount,
            ));
        }

        Ok(())
    }

    /// Mutations: debit the recipient, mark the original reversed, append
    /// the reversal entry
    ///
    /// The reversal entry keeps the recipient as `to_account` and has no
    /// sending side, matching the shape of the deposit it undoes.
    pub fn mutations(&self, original: &Transaction) -> Vec<Mutation> {
        vec![
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
                from_account: None,
                to_account: original.to_account,
                reverses: Some(original.id),
            }),
        ]
    }
}
