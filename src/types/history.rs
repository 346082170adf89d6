//! History view types for the wallet ledger
//!
//! These types carry the per-account transaction history as it is presented
//! to the account holder: rows are relabeled and annotated relative to the
//! viewing account, joined with the counterpart's public details.

use super::transaction::{Transaction, TransactionId, TransactionKind, TransactionStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Displayed kind of a history row
///
/// Mirrors [`TransactionKind`] plus `Received`: a transfer viewed from the
/// receiving side is relabeled so the holder sees incoming and outgoing
/// transfers as distinct row types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryKind {
    Deposit,
    Transfer,
    Received,
    Reversal,
}

/// Public details of the account on the other side of a transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Party {
    pub name: String,
    pub email: String,
}

/// Summary of the transaction a reversal row undoes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversedRef {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A raw history row as produced by the transaction store
///
/// Carries the ledger entry together with the joined party details for both
/// sides and, for reversal rows, a summary of the reversed transaction. The
/// ledger engine turns these into viewer-relative [`HistoryEntry`] values.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    /// The underlying ledger entry
    pub transaction: Transaction,

    /// Public details of the debited account, if the entry has one
    pub from_party: Option<Party>,

    /// Public details of the credited account
    pub to_party: Party,

    /// Summary of the reversed transaction, set only for reversal rows
    pub reversed: Option<ReversedRef>,
}

/// A history row annotated for one viewing account
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Transaction identifier
    pub id: TransactionId,

    /// Displayed kind, relabeled relative to the viewer
    #[serde(rename = "type")]
    pub kind: HistoryKind,

    /// Lifecycle status of the underlying entry
    pub status: TransactionStatus,

    /// Transaction amount
    pub amount: Decimal,

    /// Whether this row credits the viewer's balance
    pub is_positive: bool,

    /// The account on the other side of the row, if any
    ///
    /// `None` for deposits and for reversals of deposits, which involve a
    /// single account.
    pub counterparty: Option<Party>,

    /// Summary of the reversed transaction, set only for reversal rows
    pub reverses: Option<ReversedRef>,

    /// Creation time of the underlying entry
    pub created_at: DateTime<Utc>,
}
