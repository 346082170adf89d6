//! Error types for the wallet ledger
//!
//! This module defines all error conditions that ledger operations can
//! surface. Every variant carries the context needed to diagnose the failure
//! and maps onto a client-visible class via [`LedgerError::class`].
//!
//! # Error Categories
//!
//! - **Lookup errors**: account, e-mail, or transaction does not resolve
//! - **Registration/login errors**: duplicate e-mail, credential mismatch
//! - **State errors**: reversing an already-reversed transaction, reversing
//!   a reversal
//! - **Authorization errors**: self-transfer, reversal by a non-party
//! - **Balance errors**: any operation that would drive a balance negative
//! - **Storage errors**: unexpected persistence-layer failures

use super::transaction::{AccountId, TransactionId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for ledger operations
///
/// All failures are detected synchronously before or during the atomic unit;
/// none are retried by the ledger itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// No account exists with the given identifier
    #[error("Account {id} not found")]
    AccountNotFound {
        /// The identifier that did not resolve
        id: AccountId,
    },

    /// No account exists with the given e-mail address
    #[error("No account registered for e-mail {email}")]
    EmailNotFound {
        /// The e-mail that did not resolve
        email: String,
    },

    /// No transaction exists with the given identifier
    #[error("Transaction {id} not found")]
    TransactionNotFound {
        /// The identifier that did not resolve
        id: TransactionId,
    },

    /// An account with this e-mail address already exists
    #[error("E-mail {email} is already registered")]
    EmailTaken {
        /// The duplicate e-mail address
        email: String,
    },

    /// Login password did not match the stored credential
    ///
    /// Deliberately carries no detail; the audit sink receives the specifics
    /// as a security event.
    #[error("Invalid e-mail or password")]
    InvalidCredentials,

    /// The transaction has already been reversed
    ///
    /// A transaction may be reversed at most once.
    #[error("Transaction {id} has already been reversed")]
    AlreadyReversed {
        /// The transaction whose status is already `Reversed`
        id: TransactionId,
    },

    /// The transaction is itself a reversal and cannot be reversed
    #[error("Transaction {id} is a reversal and cannot be reversed")]
    ReversalOfReversal {
        /// The reversal-kind transaction
        id: TransactionId,
    },

    /// An account attempted to transfer funds to itself
    #[error("Account {account} cannot transfer to itself")]
    SelfTransfer {
        /// The account on both sides of the attempted transfer
        account: AccountId,
    },

    /// The caller is neither the sender nor the receiver of the transaction
    #[error("Account {account} is not permitted to reverse transaction {transaction}")]
    ReversalForbidden {
        /// The transaction the caller tried to reverse
        transaction: TransactionId,
        /// The caller
        account: AccountId,
    },

    /// The operation would drive an account balance negative
    ///
    /// Raised by a transfer exceeding the sender's balance, or by a deposit
    /// reversal after the recipient has spent the funds.
    #[error(
        "Insufficient balance for account {account}: balance {balance}, requested {requested}"
    )]
    InsufficientBalance {
        /// The account that lacks funds
        account: AccountId,
        /// Balance at the time of the check
        balance: Decimal,
        /// Amount the operation needed
        requested: Decimal,
    },

    /// A monetary amount was zero or negative
    #[error("Amount {amount} must be strictly positive")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Unexpected persistence-layer failure
    ///
    /// The in-flight atomic unit is aborted; no partial mutation is ever
    /// observable. Surfaced to clients as a generic server fault.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the failure
        message: String,
    },
}

/// Client-visible classification of a [`LedgerError`]
///
/// The transport collaborator maps each class onto its protocol-equivalent
/// status; [`ErrorClass::status_code`] gives the HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// An identifier or e-mail did not resolve (404-equivalent)
    NotFound,
    /// Duplicate e-mail at registration (409-equivalent)
    Conflict,
    /// Credential mismatch at login (401-equivalent)
    Unauthorized,
    /// The operation is invalid for the entity's current state
    /// (400-equivalent)
    InvalidState,
    /// The caller is not permitted to perform the operation (403-equivalent)
    Forbidden,
    /// The operation would drive a balance negative (400-equivalent)
    InsufficientBalance,
    /// Unexpected server-side failure (500-equivalent)
    Internal,
}

impl ErrorClass {
    /// HTTP status code equivalent for this class
    pub fn status_code(self) -> u16 {
        match self {
            ErrorClass::NotFound => 404,
            ErrorClass::Conflict => 409,
            ErrorClass::Unauthorized => 401,
            ErrorClass::InvalidState => 400,
            ErrorClass::Forbidden => 403,
            ErrorClass::InsufficientBalance => 400,
            ErrorClass::Internal => 500,
        }
    }
}

impl LedgerError {
    /// Classify this error for the transport collaborator
    pub fn class(&self) -> ErrorClass {
        match self {
            LedgerError::AccountNotFound { .. }
            | LedgerError::EmailNotFound { .. }
            | LedgerError::TransactionNotFound { .. } => ErrorClass::NotFound,
            LedgerError::EmailTaken { .. } => ErrorClass::Conflict,
            LedgerError::InvalidCredentials => ErrorClass::Unauthorized,
            LedgerError::AlreadyReversed { .. }
            | LedgerError::ReversalOfReversal { .. }
            | LedgerError::InvalidAmount { .. } => ErrorClass::InvalidState,
            LedgerError::SelfTransfer { .. } | LedgerError::ReversalForbidden { .. } => {
                ErrorClass::Forbidden
            }
            LedgerError::InsufficientBalance { .. } => ErrorClass::InsufficientBalance,
            LedgerError::Storage { .. } => ErrorClass::Internal,
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an AccountNotFound error
    pub fn account_not_found(id: AccountId) -> Self {
        LedgerError::AccountNotFound { id }
    }

    /// Create an EmailNotFound error
    pub fn email_not_found(email: &str) -> Self {
        LedgerError::EmailNotFound {
            email: email.to_string(),
        }
    }

    /// Create a TransactionNotFound error
    pub fn transaction_not_found(id: TransactionId) -> Self {
        LedgerError::TransactionNotFound { id }
    }

    /// Create an EmailTaken error
    pub fn email_taken(email: &str) -> Self {
        LedgerError::EmailTaken {
            email: email.to_string(),
        }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(account: AccountId, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientBalance {
            account,
            balance,
            requested,
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        LedgerError::Storage {
            message: message.into(),
        }
    }
}
