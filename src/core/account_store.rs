//! Account store
//!
//! This module provides the `AccountStore`, the component that owns user
//! balance state. It exposes point reads, registration-time creation, and a
//! balance-adjustment intent that only takes effect inside a committed
//! atomic unit.

use crate::core::database::{Database, Mutation};
use crate::types::{Account, AccountId, LedgerError};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Read and mutate access to account state
///
/// A thin view over the shared [`Database`]; cloning the store is cheap and
/// every clone observes the same state.
#[derive(Clone)]
pub struct AccountStore {
    db: Arc<Database>,
}

impl AccountStore {
    /// Create a store over the given backing database
    pub fn new(db: Arc<Database>) -> Self {
        AccountStore { db }
    }

    /// Look up an account by identifier
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account has this identifier.
    pub fn get(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.db
            .account(id)
            .ok_or(LedgerError::AccountNotFound { id })
    }

    /// Look up an account by e-mail address
    ///
    /// E-mails are compared case-sensitively as stored.
    ///
    /// # Errors
    ///
    /// Returns `EmailNotFound` if no account is registered for this e-mail.
    pub fn get_by_email(&self, email: &str) -> Result<Account, LedgerError> {
        self.db
            .account_by_email(email)
            .ok_or_else(|| LedgerError::email_not_found(email))
    }

    /// Create a new account with a zero balance
    ///
    /// The credential hash comes from the authentication collaborator; the
    /// store never sees the raw password.
    ///
    /// # Errors
    ///
    /// Returns `EmailTaken` if the e-mail is already registered.
    pub fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, LedgerError> {
        self.db
            .insert_account(Account::new(name, email, password_hash))
    }

    /// Build a balance-adjustment intent for the enclosing atomic unit
    ///
    /// The adjustment is durable only if the unit it is submitted with
    /// commits; it is never applied standalone when part of a compound
    /// operation. Commit-time validation rejects any adjustment that would
    /// drive the balance negative.
    pub fn adjust_balance(&self, account: AccountId, delta: Decimal) -> Mutation {
        Mutation::AdjustBalance { account, delta }
    }
}
