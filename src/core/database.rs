//! In-memory backing store with an atomic-unit commit primitive
//!
//! This module provides the [`Database`], the reference implementation of
//! the persistence collaborator the ledger depends on. It exposes point
//! reads for accounts and transactions, and a [`commit`](Database::commit)
//! primitive that applies an ordered list of [`Mutation`] intents
//! all-or-nothing.
//!
//! # Consistency
//!
//! A single write lock serializes all commits, standing in for the row-level
//! locking a relational store would provide. Commit re-validates every
//! mutation against the locked state before applying anything: a balance
//! decrement that would go negative, or a status transition on an
//! already-reversed transaction, fails the whole unit. Engine-side checks
//! are therefore advisory; the commit-time checks are authoritative, which
//! is what makes concurrent operations on one account safe.

use crate::types::{
    Account, AccountId, LedgerError, NewTransaction, Transaction, TransactionId, TransactionStatus,
};
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// A single mutation intent within an atomic unit
///
/// Mutations are built by the account and transaction stores and submitted
/// to [`Database::commit`] as an ordered list. They take effect only if the
/// whole list commits.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Add `delta` (possibly negative) to an account's balance
    AdjustBalance {
        /// The account to adjust
        account: AccountId,
        /// Signed balance change
        delta: Decimal,
    },

    /// Append a new ledger entry
    InsertTransaction(NewTransaction),

    /// Update a transaction's lifecycle status
    SetStatus {
        /// The transaction to update
        transaction: TransactionId,
        /// The status to set
        status: TransactionStatus,
    },
}

/// Results of a committed atomic unit
///
/// Holds the post-commit account snapshots and created ledger entries in
/// the order their mutations appeared, mirroring how a transactional store
/// returns one result per batched statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReceipt {
    /// Updated account snapshots, one per `AdjustBalance`, in mutation order
    pub accounts: Vec<Account>,

    /// Created ledger entries, one per `InsertTransaction`, in mutation order
    pub created: Vec<Transaction>,
}

struct Inner {
    accounts: HashMap<AccountId, Account>,
    by_email: HashMap<String, AccountId>,
    /// Ledger entries in creation order; history queries walk this in
    /// reverse for newest-first ordering.
    transactions: Vec<Transaction>,
    tx_index: HashMap<TransactionId, usize>,
}

/// In-memory backing store
///
/// Cheap to share behind an `Arc`; all interior mutability is guarded by a
/// read-write lock. Reads take the read lock, commits take the write lock.
pub struct Database {
    inner: RwLock<Inner>,
}

impl Database {
    /// Create an empty store
    pub fn new() -> Self {
        Database {
            inner: RwLock::new(Inner {
                accounts: HashMap::new(),
                by_email: HashMap::new(),
                transactions: Vec::new(),
                tx_index: HashMap::new(),
            }),
        }
    }

    /// Point read of an account by identifier
    pub fn account(&self, id: AccountId) -> Option<Account> {
        self.inner.read().accounts.get(&id).cloned()
    }

    /// Point read of an account by e-mail, compared case-sensitively
    pub fn account_by_email(&self, email: &str) -> Option<Account> {
        let inner = self.inner.read();
        let id = inner.by_email.get(email)?;
        inner.accounts.get(id).cloned()
    }

    /// Insert a freshly registered account
    ///
    /// This is the one standalone write outside the atomic unit: account
    /// creation never composes with balance or transaction mutations.
    ///
    /// # Errors
    ///
    /// Returns `EmailTaken` if an account with the same e-mail already
    /// exists. The check and the insert happen under one write lock, so
    /// concurrent registrations of the same e-mail cannot both succeed.
    pub fn insert_account(&self, account: Account) -> Result<Account, LedgerError> {
        let mut inner = self.inner.write();

        if inner.by_email.contains_key(&account.email) {
            return Err(LedgerError::email_taken(&account.email));
        }

        inner.by_email.insert(account.email.clone(), account.id);
        inner.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    /// Point read of a transaction by identifier
    pub fn transaction(&self, id: TransactionId) -> Option<Transaction> {
        let inner = self.inner.read();
        let index = inner.tx_index.get(&id)?;
        inner.transactions.get(*index).cloned()
    }

    /// All transactions where the account is sender or receiver, newest first
    pub fn transactions_for(&self, account: AccountId) -> Vec<Transaction> {
        self.inner
            .read()
            .transactions
            .iter()
            .rev()
            .filter(|tx| tx.involves(account))
            .cloned()
            .collect()
    }

    /// Apply an ordered list of mutations all-or-nothing
    ///
    /// Validates every mutation against the state visible under the write
    /// lock, tracking the running effect of earlier mutations in the list,
    /// then applies them in order. If any mutation fails validation, nothing
    /// is applied and the error of the offending mutation is returned.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` / `TransactionNotFound` if a referenced row is
    ///   missing
    /// - `InsufficientBalance` if a decrement would drive a balance negative
    /// - `AlreadyReversed` if a status update targets a transaction that is
    ///   no longer `Completed`
    pub fn commit(&self, mutations: &[Mutation]) -> Result<CommitReceipt, LedgerError> {
        let mut inner = self.inner.write();

        // Validation pass: simulate the unit against staged copies so later
        // mutations see the effect of earlier ones.
        let mut staged_balances: HashMap<AccountId, Decimal> = HashMap::new();
        let mut staged_statuses: HashMap<TransactionId, TransactionStatus> = HashMap::new();

        for mutation in mutations {
            match mutation {
                Mutation::AdjustBalance { account, delta } => {
                    let current = match staged_balances.get(account) {
                        Some(balance) => *balance,
                        None => {
                            inner
                                .accounts
                                .get(account)
                                .ok_or(LedgerError::AccountNotFound { id: *account })?
                                .balance
                        }
                    };
                    let next = current + *delta;
                    if next < Decimal::ZERO {
                        return Err(LedgerError::insufficient_balance(*account, current, -*delta));
                    }
                    staged_balances.insert(*account, next);
                }
                Mutation::InsertTransaction(new) => {
                    if let Some(from) = new.from_account {
                        if !inner.accounts.contains_key(&from) {
                            return Err(LedgerError::AccountNotFound { id: from });
                        }
                    }
                    if !inner.accounts.contains_key(&new.to_account) {
                        return Err(LedgerError::AccountNotFound { id: new.to_account });
                    }
                }
                Mutation::SetStatus {
                    transaction,
                    status: _,
                } => {
                    let current = match staged_statuses.get(transaction) {
                        Some(status) => *status,
                        None => {
                            let index = inner
                                .tx_index
                                .get(transaction)
                                .ok_or(LedgerError::TransactionNotFound { id: *transaction })?;
                            inner.transactions[*index].status
                        }
                    };
                    // Completed -> Reversed is the only legal transition.
                    if current == TransactionStatus::Reversed {
                        return Err(LedgerError::AlreadyReversed { id: *transaction });
                    }
                    staged_statuses.insert(*transaction, TransactionStatus::Reversed);
                }
            }
        }

        // Apply pass: infallible now that the whole unit validated.
        let now = Utc::now();
        let mut receipt = CommitReceipt {
            accounts: Vec::new(),
            created: Vec::new(),
        };

        for mutation in mutations {
            match mutation {
                Mutation::AdjustBalance { account, delta } => {
                    let entry = inner
                        .accounts
                        .get_mut(account)
                        .ok_or_else(|| LedgerError::storage("validated account vanished"))?;
                    entry.balance += *delta;
                    entry.updated_at = now;
                    receipt.accounts.push(entry.clone());
                }
                Mutation::InsertTransaction(new) => {
                    let transaction = Transaction {
                        id: uuid::Uuid::new_v4(),
                        kind: new.kind,
                        amount: new.amount,
                        status: TransactionStatus::Completed,
                        from_account: new.from_account,
                        to_account: new.to_account,
                        reverses: new.reverses,
                        created_at: now,
                    };
                    let index = inner.transactions.len();
                    inner.tx_index.insert(transaction.id, index);
                    inner.transactions.push(transaction.clone());
                    receipt.created.push(transaction);
                }
                Mutation::SetStatus {
                    transaction,
                    status,
                } => {
                    let index = *inner
                        .tx_index
                        .get(transaction)
                        .ok_or_else(|| LedgerError::storage("validated transaction vanished"))?;
                    inner.transactions[index].status = *status;
                }
            }
        }

        Ok(receipt)
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}
