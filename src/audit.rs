//! Audit event surface
//!
//! The ledger emits one structured event per completed deposit, transfer,
//! and reversal, and one security event per unauthorized reversal attempt or
//! failed login. The sink itself is an external collaborator; this module
//! defines the event vocabulary, the sink trait, a `tracing`-backed default,
//! and an in-memory sink for tests.

use crate::types::{AccountId, TransactionId, TransactionKind};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{info, warn};

/// A structured audit event emitted by the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    /// A deposit was committed
    Deposit {
        transaction: TransactionId,
        account: AccountId,
        amount: Decimal,
        /// Recipient balance after the deposit
        new_balance: Decimal,
    },

    /// A transfer was committed
    Transfer {
        transaction: TransactionId,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    },

    /// A reversal was committed
    Reversal {
        /// The newly created reversal entry
        reversal: TransactionId,
        /// The transaction that was reversed
        original: TransactionId,
        original_kind: TransactionKind,
        /// The account that requested the reversal
        caller: AccountId,
        amount: Decimal,
    },

    /// Security event: a non-party attempted to reverse a transaction
    UnauthorizedReversal {
        transaction: TransactionId,
        account: AccountId,
    },

    /// Security event: a login attempt with a wrong password
    FailedLogin { account: AccountId, email: String },
}

impl AuditEvent {
    /// Whether this event records a rejected action rather than a completed
    /// operation
    pub fn is_security_event(&self) -> bool {
        matches!(
            self,
            AuditEvent::UnauthorizedReversal { .. } | AuditEvent::FailedLogin { .. }
        )
    }
}

/// Destination for audit events
///
/// Implementations must be safe to share across request-serving threads.
pub trait AuditSink: Send + Sync {
    /// Record a single event
    fn record(&self, event: &AuditEvent);
}

/// Default sink that forwards events to `tracing` under the `audit` target
///
/// Completed operations log at info, security events at warn.
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&self, event: &AuditEvent) {
        match event {
            AuditEvent::Deposit {
                transaction,
                account,
                amount,
                new_balance,
            } => info!(
                target: "audit",
                %transaction, %account, %amount, %new_balance, "DEPOSIT"
            ),
            AuditEvent::Transfer {
                transaction,
                from,
                to,
                amount,
            } => info!(target: "audit", %transaction, %from, %to, %amount, "TRANSFER"),
            AuditEvent::Reversal {
                reversal,
                original,
                original_kind,
                caller,
                amount,
            } => info!(
                target: "audit",
                %reversal, %original, ?original_kind, %caller, %amount, "REVERSAL"
            ),
            AuditEvent::UnauthorizedReversal {
                transaction,
                account,
            } => warn!(
                target: "audit",
                %transaction, %account, "UNAUTHORIZED_REVERSAL_ATTEMPT"
            ),
            AuditEvent::FailedLogin { account, email } => warn!(
                target: "audit",
                %account, %email, "LOGIN_FAILED_INVALID_PASSWORD"
            ),
        }
    }
}

/// In-memory sink that retains every event, for assertions in tests
#[derive(Default)]
pub struct MemoryAudit {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events in emission order
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_memory_sink_retains_order() {
        let sink = MemoryAudit::new();
        let account = Uuid::new_v4();

        let first = AuditEvent::Deposit {
            transaction: Uuid::new_v4(),
            account,
            amount: Decimal::new(1000, 2),
            new_balance: Decimal::new(1000, 2),
        };
        let second = AuditEvent::UnauthorizedReversal {
            transaction: Uuid::new_v4(),
            account,
        };

        sink.record(&first);
        sink.record(&second);

        assert_eq!(sink.events(), vec![first, second]);
    }

    #[test]
    fn test_security_event_classification() {
        let account = Uuid::new_v4();

        assert!(AuditEvent::FailedLogin {
            account,
            email: "ada@example.com".to_string()
        }
        .is_security_event());

        assert!(!AuditEvent::Transfer {
            transaction: Uuid::new_v4(),
            from: account,
            to: Uuid::new_v4(),
            amount: Decimal::ONE,
        }
        .is_security_event());
    }
}
