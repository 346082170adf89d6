//! Ledger engine
//!
//! This module provides the `LedgerEngine` that orchestrates deposits,
//! transfers, reversals, and history assembly by coordinating the
//! AccountStore and TransactionStore components.
//!
//! The engine enforces the business rules:
//! - Ownership checks before any mutation (accounts must exist, reversals
//!   only by a party to the transaction)
//! - Sufficiency checks (no balance ever goes negative)
//! - The reversal state machine (Completed -> Reversed, at most once, never
//!   for a reversal entry)
//!
//! Every multi-row mutation is submitted to the backing store as one atomic
//! unit; the engine holds no locks and keeps no state between calls.

use crate::audit::{AuditEvent, AuditSink};
use crate::core::account_store::AccountStore;
use crate::core::database::Database;
use crate::core::transaction_store::TransactionStore;
use crate::strategy::ReversalStrategy;
use crate::types::{
    Account, AccountId, HistoryEntry, HistoryKind, HistoryRow, LedgerError, NewTransaction,
    Transaction, TransactionId, TransactionKind, TransactionStatus,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a successful deposit
#[derive(Debug, Clone, PartialEq)]
pub struct DepositReceipt {
    /// The recipient account with its updated balance
    pub account: Account,
    /// The created DEPOSIT entry
    pub transaction: Transaction,
}

/// Orchestrates ledger operations over the shared backing store
///
/// Serves concurrent callers; all durable state lives in the store, and the
/// store's atomic unit is the sole concurrency-correctness mechanism.
pub struct LedgerEngine {
    db: Arc<Database>,
    accounts: AccountStore,
    transactions: TransactionStore,
    audit: Arc<dyn AuditSink>,
}

impl LedgerEngine {
    /// Create an engine over the given store and audit sink
    pub fn new(db: Arc<Database>, audit: Arc<dyn AuditSink>) -> Self {
        LedgerEngine {
            accounts: AccountStore::new(db.clone()),
            transactions: TransactionStore::new(db.clone()),
            db,
            audit,
        }
    }

    /// The engine's account store
    ///
    /// Shared with the authentication service so registration and ledger
    /// operations observe the same accounts.
    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Credit an account and record a DEPOSIT entry
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is not strictly positive
    /// - `AccountNotFound` if the account does not exist
    pub fn deposit(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<DepositReceipt, LedgerError> {
        info!(%account_id, %amount, "processing deposit");

        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }
        self.accounts.get(account_id)?;

        let receipt = self.db.commit(&[
            self.accounts.adjust_balance(account_id, amount),
            self.transactions.create(NewTransaction {
                kind: TransactionKind::Deposit,
                amount,
                from_account: None,
                to_account: account_id,
                reverses: None,
            }),
        ])?;

        let account = receipt
            .accounts
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::storage("deposit commit returned no account update"))?;
        let transaction = receipt
            .created
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::storage("deposit commit returned no created entry"))?;

        self.audit.record(&AuditEvent::Deposit {
            transaction: transaction.id,
            account: account_id,
            amount,
            new_balance: account.balance,
        });

        Ok(DepositReceipt {
            account,
            transaction,
        })
    }

    /// Move funds to the account registered under `to_email` and record a
    /// TRANSFER entry
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is not strictly positive
    /// - `AccountNotFound` / `EmailNotFound` if either party is missing
    /// - `SelfTransfer` if the recipient resolves to the sender
    /// - `InsufficientBalance` if the sender's balance is below `amount`
    pub fn transfer(
        &self,
        from: AccountId,
        to_email: &str,
        amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        info!(%from, to_email, %amount, "processing transfer");

        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }
        let sender = self.accounts.get(from)?;
        let recipient = self.accounts.get_by_email(to_email)?;

        if recipient.id == sender.id {
            warn!(%from, "transfer to self attempted");
            return Err(LedgerError::SelfTransfer { account: from });
        }

        if sender.balance < amount {
            warn!(%from, balance = %sender.balance, requested = %amount, "transfer failed: insufficient balance");
            return Err(LedgerError::insufficient_balance(
                from,
                sender.balance,
                amount,
            ));
        }

        let receipt = self.db.commit(&[
            self.accounts.adjust_balance(sender.id, -amount),
            self.accounts.adjust_balance(recipient.id, amount),
            self.transactions.create(NewTransaction {
                kind: TransactionKind::Transfer,
                amount,
                from_account: Some(sender.id),
                to_account: recipient.id,
                reverses: None,
            }),
        ])?;

        let transaction = receipt
            .created
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::storage("transfer commit returned no created entry"))?;

        self.audit.record(&AuditEvent::Transfer {
            transaction: transaction.id,
            from: sender.id,
            to: recipient.id,
            amount,
        });

        Ok(transaction)
    }

    /// Undo a prior deposit or transfer on behalf of `caller`
    ///
    /// Either the original sender or the original receiver may reverse a
    /// transaction, not only its initiator. The original entry is marked
    /// `Reversed` and a new REVERSAL entry referencing it is appended; the
    /// original is never deleted.
    ///
    /// # Errors
    ///
    /// - `TransactionNotFound` if the id does not resolve
    /// - `AlreadyReversed` if the entry was reversed before
    /// - `ReversalOfReversal` if the entry is itself a reversal
    /// - `ReversalForbidden` if `caller` is neither party (also raises a
    ///   security audit event)
    /// - `InsufficientBalance` if undoing the entry would drive a balance
    ///   negative
    pub fn reverse(
        &self,
        transaction_id: TransactionId,
        caller: AccountId,
    ) -> Result<Transaction, LedgerError> {
        info!(%transaction_id, %caller, "processing reversal");

        let original = self.transactions.get(transaction_id)?;

        if original.status == TransactionStatus::Reversed {
            warn!(%transaction_id, "reversal failed: transaction already reversed");
            return Err(LedgerError::AlreadyReversed { id: transaction_id });
        }

        if original.kind == TransactionKind::Reversal {
            warn!(%transaction_id, "reversal failed: cannot reverse a reversal");
            return Err(LedgerError::ReversalOfReversal { id: transaction_id });
        }

        if !original.involves(caller) {
            self.audit.record(&AuditEvent::UnauthorizedReversal {
                transaction: transaction_id,
                account: caller,
            });
            return Err(LedgerError::ReversalForbidden {
                transaction: transaction_id,
                account: caller,
            });
        }

        let strategy = ReversalStrategy::resolve(&original);

        if let Some(validate) = strategy.validation() {
            validate(&original, &self.accounts)?;
        }

        let mutations = strategy.mutations(&original)?;
        let receipt = self.db.commit(&mutations)?;

        let reversal = receipt
            .created
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::storage("reversal commit returned no created entry"))?;

        self.audit.record(&AuditEvent::Reversal {
            reversal: reversal.id,
            original: original.id,
            original_kind: original.kind,
            caller,
            amount: original.amount,
        });

        Ok(reversal)
    }

    /// Assemble the account's transaction history, newest first
    ///
    /// Rows are relabeled and annotated relative to the viewing account: a
    /// transfer seen by its receiver becomes `Received`, and `is_positive`
    /// marks the rows that credit the viewer's balance.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub fn history(&self, account_id: AccountId) -> Result<Vec<HistoryEntry>, LedgerError> {
        self.accounts.get(account_id)?;

        let rows = self.transactions.history_for(account_id)?;
        Ok(rows
            .into_iter()
            .map(|row| annotate(row, account_id))
            .collect())
    }
}

/// Relabel and annotate one history row for the viewing account
///
/// A row credits the viewer when it is a deposit, a transfer received by the
/// viewer, or a reversal whose entry pays the viewer back. Reversal rows are
/// oriented by the strategies so that `to_account` is the credited party
/// when a transfer is undone; a reversed deposit credits no one, it only
/// takes funds back.
fn annotate(row: HistoryRow, viewer: AccountId) -> HistoryEntry {
    let tx = &row.transaction;

    let received = tx.kind == TransactionKind::Transfer
        && tx.to_account == viewer
        && tx.from_account != Some(viewer);

    let kind = match tx.kind {
        TransactionKind::Deposit => HistoryKind::Deposit,
        TransactionKind::Transfer if received => HistoryKind::Received,
        TransactionKind::Transfer => HistoryKind::Transfer,
        TransactionKind::Reversal => HistoryKind::Reversal,
    };

    let is_positive = match tx.kind {
        TransactionKind::Deposit => true,
        TransactionKind::Transfer => tx.to_account == viewer,
        TransactionKind::Reversal => {
            row.reversed
                .as_ref()
                .is_some_and(|reversed| reversed.kind == TransactionKind::Transfer)
                && tx.to_account == viewer
        }
    };

    let counterparty = if tx.to_account == viewer {
        row.from_party
    } else {
        Some(row.to_party)
    };

    HistoryEntry {
        id: tx.id,
        kind,
        status: tx.status,
        amount: tx.amount,
        is_positive,
        counterparty,
        reverses: row.reversed,
        created_at: row.transaction.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAudit;
    use uuid::Uuid;

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn engine() -> (LedgerEngine, Arc<MemoryAudit>) {
        let audit = Arc::new(MemoryAudit::new());
        let engine = LedgerEngine::new(Arc::new(Database::new()), audit.clone());
        (engine, audit)
    }

    fn register(engine: &LedgerEngine, name: &str, email: &str) -> Account {
        engine.accounts().create(name, email, "hash").unwrap()
    }

    #[test]
    fn test_deposit_credits_balance_and_records_entry() {
        let (engine, audit) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");

        let receipt = engine.deposit(ada.id, dec(1000)).unwrap();

        assert_eq!(receipt.account.balance, dec(1000));
        assert_eq!(receipt.transaction.kind, TransactionKind::Deposit);
        assert_eq!(receipt.transaction.amount, dec(1000));
        assert_eq!(receipt.transaction.status, TransactionStatus::Completed);
        assert_eq!(receipt.transaction.from_account, None);
        assert_eq!(receipt.transaction.to_account, ada.id);

        assert_eq!(
            audit.events(),
            vec![AuditEvent::Deposit {
                transaction: receipt.transaction.id,
                account: ada.id,
                amount: dec(1000),
                new_balance: dec(1000),
            }]
        );
    }

    #[test]
    fn test_deposit_to_unknown_account_fails() {
        let (engine, _) = engine();
        let id = Uuid::new_v4();

        let result = engine.deposit(id, dec(1000));

        assert_eq!(result, Err(LedgerError::AccountNotFound { id }));
    }

    #[test]
    fn test_deposit_rejects_non_positive_amount() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");

        assert!(matches!(
            engine.deposit(ada.id, Decimal::ZERO).unwrap_err(),
            LedgerError::InvalidAmount { .. }
        ));
        assert!(matches!(
            engine.deposit(ada.id, dec(-100)).unwrap_err(),
            LedgerError::InvalidAmount { .. }
        ));
    }

    #[test]
    fn test_transfer_moves_funds_and_preserves_total() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let bob = register(&engine, "Bob", "bob@example.com");
        engine.deposit(ada.id, dec(10000)).unwrap();
        engine.deposit(bob.id, dec(500)).unwrap();

        let tx = engine
            .transfer(ada.id, "bob@example.com", dec(2500))
            .unwrap();

        let ada_after = engine.accounts().get(ada.id).unwrap();
        let bob_after = engine.accounts().get(bob.id).unwrap();
        assert_eq!(ada_after.balance, dec(7500));
        assert_eq!(bob_after.balance, dec(3000));
        assert_eq!(ada_after.balance + bob_after.balance, dec(10500));

        assert_eq!(tx.kind, TransactionKind::Transfer);
        assert_eq!(tx.from_account, Some(ada.id));
        assert_eq!(tx.to_account, bob.id);
        assert_eq!(tx.status, TransactionStatus::Completed);
    }

    #[test]
    fn test_transfer_to_unknown_email_fails() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        engine.deposit(ada.id, dec(1000)).unwrap();

        let result = engine.transfer(ada.id, "nobody@example.com", dec(100));

        assert_eq!(result, Err(LedgerError::email_not_found("nobody@example.com")));
    }

    #[test]
    fn test_self_transfer_is_forbidden_regardless_of_balance() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        engine.deposit(ada.id, dec(10000)).unwrap();

        let result = engine.transfer(ada.id, "ada@example.com", dec(100));

        assert_eq!(result, Err(LedgerError::SelfTransfer { account: ada.id }));
        assert_eq!(result.unwrap_err().class().status_code(), 403);
    }

    #[test]
    fn test_transfer_with_insufficient_balance_changes_nothing() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let bob = register(&engine, "Bob", "bob@example.com");
        engine.deposit(ada.id, dec(500)).unwrap();

        let result = engine.transfer(ada.id, "bob@example.com", dec(1000));

        assert!(matches!(
            result.unwrap_err(),
            LedgerError::InsufficientBalance { .. }
        ));
        assert_eq!(engine.accounts().get(ada.id).unwrap().balance, dec(500));
        assert_eq!(engine.accounts().get(bob.id).unwrap().balance, dec(0));
        // No TRANSFER entry was recorded.
        assert_eq!(engine.history(bob.id).unwrap().len(), 0);
    }

    #[test]
    fn test_reversing_a_deposit_restores_the_pre_deposit_balance() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        engine.deposit(ada.id, dec(500)).unwrap();
        let deposit = engine.deposit(ada.id, dec(1000)).unwrap();

        let reversal = engine.reverse(deposit.transaction.id, ada.id).unwrap();

        assert_eq!(engine.accounts().get(ada.id).unwrap().balance, dec(500));
        assert_eq!(reversal.kind, TransactionKind::Reversal);
        assert_eq!(reversal.reverses, Some(deposit.transaction.id));
        assert_eq!(reversal.from_account, None);
        assert_eq!(reversal.to_account, ada.id);

        let history = engine.history(ada.id).unwrap();
        let original = history
            .iter()
            .find(|entry| entry.id == deposit.transaction.id)
            .unwrap();
        assert_eq!(original.status, TransactionStatus::Reversed);
    }

    #[test]
    fn test_deposit_reversal_fails_after_funds_were_spent() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let bob = register(&engine, "Bob", "bob@example.com");
        let deposit = engine.deposit(ada.id, dec(1000)).unwrap();
        engine.transfer(ada.id, "bob@example.com", dec(800)).unwrap();

        let result = engine.reverse(deposit.transaction.id, ada.id);

        assert!(matches!(
            result.unwrap_err(),
            LedgerError::InsufficientBalance { .. }
        ));
        // Balances untouched by the failed reversal.
        assert_eq!(engine.accounts().get(ada.id).unwrap().balance, dec(200));
        assert_eq!(engine.accounts().get(bob.id).unwrap().balance, dec(800));
    }

    #[test]
    fn test_reversing_a_transfer_restores_both_balances() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let bob = register(&engine, "Bob", "bob@example.com");
        engine.deposit(ada.id, dec(10000)).unwrap();
        engine.deposit(bob.id, dec(500)).unwrap();
        let tx = engine
            .transfer(ada.id, "bob@example.com", dec(2500))
            .unwrap();

        engine.reverse(tx.id, ada.id).unwrap();

        assert_eq!(engine.accounts().get(ada.id).unwrap().balance, dec(10000));
        assert_eq!(engine.accounts().get(bob.id).unwrap().balance, dec(500));
    }

    #[test]
    fn test_receiver_may_reverse_a_transfer() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let bob = register(&engine, "Bob", "bob@example.com");
        engine.deposit(ada.id, dec(1000)).unwrap();
        let tx = engine.transfer(ada.id, "bob@example.com", dec(400)).unwrap();

        // The receiver, not the initiator, asks for the reversal.
        let reversal = engine.reverse(tx.id, bob.id).unwrap();

        assert_eq!(reversal.to_account, ada.id);
        assert_eq!(engine.accounts().get(ada.id).unwrap().balance, dec(1000));
    }

    #[test]
    fn test_second_reversal_of_same_transaction_fails() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let deposit = engine.deposit(ada.id, dec(1000)).unwrap();
        engine.reverse(deposit.transaction.id, ada.id).unwrap();

        let result = engine.reverse(deposit.transaction.id, ada.id);

        assert_eq!(
            result,
            Err(LedgerError::AlreadyReversed {
                id: deposit.transaction.id
            })
        );
    }

    #[test]
    fn test_a_reversal_entry_cannot_be_reversed() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let deposit = engine.deposit(ada.id, dec(1000)).unwrap();
        let reversal = engine.reverse(deposit.transaction.id, ada.id).unwrap();

        let result = engine.reverse(reversal.id, ada.id);

        assert_eq!(
            result,
            Err(LedgerError::ReversalOfReversal { id: reversal.id })
        );
    }

    #[test]
    fn test_reversal_by_non_party_is_forbidden_and_audited() {
        let (engine, audit) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let eve = register(&engine, "Eve", "eve@example.com");
        let deposit = engine.deposit(ada.id, dec(1000)).unwrap();

        let result = engine.reverse(deposit.transaction.id, eve.id);

        assert_eq!(
            result,
            Err(LedgerError::ReversalForbidden {
                transaction: deposit.transaction.id,
                account: eve.id,
            })
        );
        assert!(audit.events().contains(&AuditEvent::UnauthorizedReversal {
            transaction: deposit.transaction.id,
            account: eve.id,
        }));
        // The deposit is untouched.
        assert_eq!(engine.accounts().get(ada.id).unwrap().balance, dec(1000));
    }

    #[test]
    fn test_reverse_unknown_transaction_fails() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let id = Uuid::new_v4();

        assert_eq!(
            engine.reverse(id, ada.id),
            Err(LedgerError::TransactionNotFound { id })
        );
    }

    #[test]
    fn test_history_for_unknown_account_fails() {
        let (engine, _) = engine();
        let id = Uuid::new_v4();

        assert_eq!(
            engine.history(id),
            Err(LedgerError::AccountNotFound { id })
        );
    }

    #[test]
    fn test_history_annotates_sender_and_receiver_views() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let bob = register(&engine, "Bob", "bob@example.com");
        engine.deposit(ada.id, dec(1000)).unwrap();
        engine.transfer(ada.id, "bob@example.com", dec(400)).unwrap();

        // Sender view: deposit then outgoing transfer, newest first.
        let ada_history = engine.history(ada.id).unwrap();
        assert_eq!(ada_history.len(), 2);
        assert_eq!(ada_history[0].kind, HistoryKind::Transfer);
        assert!(!ada_history[0].is_positive);
        assert_eq!(
            ada_history[0].counterparty.as_ref().unwrap().email,
            "bob@example.com"
        );
        assert_eq!(ada_history[1].kind, HistoryKind::Deposit);
        assert!(ada_history[1].is_positive);
        assert!(ada_history[1].counterparty.is_none());

        // Receiver view: the same transfer is relabeled RECEIVED.
        let bob_history = engine.history(bob.id).unwrap();
        assert_eq!(bob_history.len(), 1);
        assert_eq!(bob_history[0].kind, HistoryKind::Received);
        assert!(bob_history[0].is_positive);
        assert_eq!(
            bob_history[0].counterparty.as_ref().unwrap().email,
            "ada@example.com"
        );
    }

    #[test]
    fn test_history_sign_of_reversal_rows() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let bob = register(&engine, "Bob", "bob@example.com");
        engine.deposit(ada.id, dec(1000)).unwrap();
        let transfer = engine.transfer(ada.id, "bob@example.com", dec(400)).unwrap();
        engine.reverse(transfer.id, ada.id).unwrap();

        // The refund credits Ada: positive from her view...
        let ada_reversal = engine
            .history(ada.id)
            .unwrap()
            .into_iter()
            .find(|entry| entry.kind == HistoryKind::Reversal)
            .unwrap();
        assert!(ada_reversal.is_positive);
        assert_eq!(
            ada_reversal.reverses.as_ref().unwrap().kind,
            TransactionKind::Transfer
        );

        // ...and negative from Bob's, whose balance it debits.
        let bob_reversal = engine
            .history(bob.id)
            .unwrap()
            .into_iter()
            .find(|entry| entry.kind == HistoryKind::Reversal)
            .unwrap();
        assert!(!bob_reversal.is_positive);
    }

    #[test]
    fn test_history_reversed_deposit_is_never_positive() {
        let (engine, _) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let deposit = engine.deposit(ada.id, dec(1000)).unwrap();
        engine.reverse(deposit.transaction.id, ada.id).unwrap();

        let reversal = engine
            .history(ada.id)
            .unwrap()
            .into_iter()
            .find(|entry| entry.kind == HistoryKind::Reversal)
            .unwrap();

        assert!(!reversal.is_positive);
        assert!(reversal.counterparty.is_none());
        assert_eq!(
            reversal.reverses.as_ref().unwrap().kind,
            TransactionKind::Deposit
        );
    }

    #[test]
    fn test_reversal_emits_audit_event() {
        let (engine, audit) = engine();
        let ada = register(&engine, "Ada", "ada@example.com");
        let deposit = engine.deposit(ada.id, dec(1000)).unwrap();
        let reversal = engine.reverse(deposit.transaction.id, ada.id).unwrap();

        assert!(audit.events().contains(&AuditEvent::Reversal {
            reversal: reversal.id,
            original: deposit.transaction.id,
            original_kind: TransactionKind::Deposit,
            caller: ada.id,
            amount: dec(1000),
        }));
    }
}
