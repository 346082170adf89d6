//! Account-related types for the wallet ledger
//!
//! This module defines the Account structure holding a user's identity and
//! current balance.

use super::transaction::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A user account and its current balance
///
/// Created on registration and never deleted in normal operation. The
/// balance is only mutated by ledger engine operations committed through the
/// store's atomic unit, which rejects any unit that would drive it negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique account identifier
    pub id: AccountId,

    /// Display name
    pub name: String,

    /// E-mail address, unique across accounts, compared case-sensitively
    /// as stored
    pub email: String,

    /// Credential hash produced by the authentication collaborator
    ///
    /// The ledger never inspects this beyond equality checks performed by
    /// the password hasher; it is never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Current balance, kept >= 0 by application logic
    pub balance: Decimal,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last mutation time, bumped on every committed balance change
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a zero balance
    ///
    /// Assigns a fresh identifier and stamps both timestamps with the
    /// current time.
    pub fn new(name: &str, email: &str, password_hash: &str) -> Self {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}
