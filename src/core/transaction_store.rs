//! Transaction store
//!
//! This module provides the `TransactionStore`, the component that owns the
//! immutable transaction log. It exposes point reads, creation and
//! status-update intents for the atomic unit, and the joined history query
//! used to assemble per-account statements.

use crate::core::database::{Database, Mutation};
use crate::types::{
    Account, AccountId, HistoryRow, LedgerError, NewTransaction, Party, ReversedRef, Transaction,
    TransactionId, TransactionStatus,
};
use std::sync::Arc;

/// Read and mutate access to the transaction log
///
/// A thin view over the shared [`Database`]; cloning the store is cheap and
/// every clone observes the same log.
#[derive(Clone)]
pub struct TransactionStore {
    db: Arc<Database>,
}

impl TransactionStore {
    /// Create a store over the given backing database
    pub fn new(db: Arc<Database>) -> Self {
        TransactionStore { db }
    }

    /// Look up a transaction by identifier
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if no transaction has this identifier.
    pub fn get(&self, id: TransactionId) -> Result<Transaction, LedgerError> {
        self.db
            .transaction(id)
            .ok_or(LedgerError::TransactionNotFound { id })
    }

    /// Build a creation intent for the enclosing atomic unit
    ///
    /// The entry is assigned its identifier, creation time, and `Completed`
    /// status when the unit commits.
    pub fn create(&self, new: NewTransaction) -> Mutation {
        Mutation::InsertTransaction(new)
    }

    /// Build a status-update intent for the enclosing atomic unit
    ///
    /// Commit-time validation enforces the `Completed` -> `Reversed`
    /// transition, so a transaction can be marked reversed at most once even
    /// under concurrent attempts.
    pub fn set_status(&self, id: TransactionId, status: TransactionStatus) -> Mutation {
        Mutation::SetStatus {
            transaction: id,
            status,
        }
    }

    /// Joined history rows for an account, newest first
    ///
    /// Returns every transaction where the account is sender or receiver,
    /// ordered descending by creation time, joined with the public details
    /// of both parties and, for reversal rows, a summary of the reversed
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a row references an account or reversed
    /// transaction that no longer resolves; accounts are never deleted, so
    /// this indicates a corrupted log.
    pub fn history_for(&self, account: AccountId) -> Result<Vec<HistoryRow>, LedgerError> {
        self.db
            .transactions_for(account)
            .into_iter()
            .map(|tx| self.join_row(tx))
            .collect()
    }

    fn join_row(&self, transaction: Transaction) -> Result<HistoryRow, LedgerError> {
        let from_party = transaction
            .from_account
            .map(|id| self.party(id))
            .transpose()?;
        let to_party = self.party(transaction.to_account)?;
        let reversed = transaction
            .reverses
            .map(|id| {
                let original = self.db.transaction(id).ok_or_else(|| {
                    LedgerError::storage(format!("reversal references missing transaction {id}"))
                })?;
                Ok::<_, LedgerError>(ReversedRef {
                    id: original.id,
                    kind: original.kind,
                    amount: original.amount,
                    created_at: original.created_at,
                })
            })
            .transpose()?;

        Ok(HistoryRow {
            transaction,
            from_party,
            to_party,
            reversed,
        })
    }

    fn party(&self, id: AccountId) -> Result<Party, LedgerError> {
        let Account { name, email, .. } = self
            .db
            .account(id)
            .ok_or_else(|| LedgerError::storage(format!("ledger references missing account {id}")))?;
        Ok(Party { name, email })
    }
}
