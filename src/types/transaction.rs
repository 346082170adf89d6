//! Transaction-related types for the wallet ledger
//!
//! This module defines the ledger entry, its kind and status enums, and the
//! identifier aliases used throughout the system.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account identifier
///
/// Opaque v4 UUID assigned by the store on registration.
pub type AccountId = Uuid;

/// Transaction identifier
///
/// Opaque v4 UUID assigned by the store when a ledger entry is created.
pub type TransactionId = Uuid;

/// Transaction kinds supported by the ledger
///
/// Deposits and transfers mutate balances directly. A reversal is a new
/// ledger entry that undoes a prior deposit or transfer; it never deletes
/// or overwrites the original row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Credit funds to a single account
    ///
    /// Increases the recipient's balance by the transaction amount.
    /// Deposits have no sending account.
    Deposit,

    /// Move funds between two accounts
    ///
    /// Decreases the sender's balance and increases the recipient's balance
    /// by the same amount. Requires sufficient sender balance to succeed.
    Transfer,

    /// Undo a prior deposit or transfer
    ///
    /// Recorded as a separate entry referencing the reversed transaction.
    /// Reversals can never themselves be reversed.
    Reversal,
}

/// Lifecycle status of a ledger entry
///
/// The only transition is `Completed` -> `Reversed`, applied at most once.
/// There is no transition out of `Reversed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// The entry has been applied to balances and is in effect
    Completed,

    /// The entry has been undone by a reversal entry
    Reversed,
}

/// A committed ledger entry
///
/// Immutable once created except for [`status`](Transaction::status), which
/// moves from `Completed` to `Reversed` exactly once when the transaction
/// is reversed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: TransactionId,

    /// The kind of transaction (deposit, transfer, or reversal)
    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// Transaction amount, always strictly positive
    pub amount: Decimal,

    /// Lifecycle status of this entry
    pub status: TransactionStatus,

    /// The debited account
    ///
    /// `None` for deposits and for reversals of deposits, which have no
    /// sending side.
    pub from_account: Option<AccountId>,

    /// The credited account
    ///
    /// For a reversal of a deposit this is the account the funds are taken
    /// back from; see the strategy module for the orientation rules.
    pub to_account: AccountId,

    /// Back-reference to the transaction this entry reverses
    ///
    /// Set only on `Reversal` entries.
    pub reverses: Option<TransactionId>,

    /// Creation time, assigned by the store on commit
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Check whether the given account is a party to this transaction
    ///
    /// Used for the reversal authorization check: either the original sender
    /// or the original receiver may reverse a transaction.
    pub fn involves(&self, account: AccountId) -> bool {
        self.from_account == Some(account) || self.to_account == account
    }
}

/// Payload for creating a new ledger entry
///
/// The store assigns the identifier and creation time on commit; new entries
/// always start in `Completed` status.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The kind of entry to create
    pub kind: TransactionKind,

    /// Transaction amount, expected to be strictly positive
    pub amount: Decimal,

    /// The debited account, if any
    pub from_account: Option<AccountId>,

    /// The credited account
    pub to_account: AccountId,

    /// Reversed-transaction back-reference, set only for reversal entries
    pub reverses: Option<TransactionId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enums_serialize_in_wire_case() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Deposit).unwrap(),
            "\"DEPOSIT\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionKind::Reversal).unwrap(),
            "\"REVERSAL\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
    }

    #[test]
    fn test_involves_matches_either_party() {
        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();
        let other = Uuid::new_v4();

        let tx = Transaction {
            id: Uuid::new_v4(),
            kind: TransactionKind::Transfer,
            amount: Decimal::new(1000, 2),
            status: TransactionStatus::Completed,
            from_account: Some(sender),
            to_account: receiver,
            reverses: None,
            created_at: Utc::now(),
        };

        assert!(tx.involves(sender));
        assert!(tx.involves(receiver));
        assert!(!tx.involves(other));
    }
}
