//! Registration and login
//!
//! Accounts authenticate with an e-mail address and a password. Only the
//! password's hash is ever stored; the default scheme is Argon2id with the
//! library's recommended parameters. Login failures are indistinguishable to
//! the caller (one `InvalidCredentials` error covers both an unknown e-mail
//! and a wrong password) while the audit sink receives the specifics.

use crate::audit::{AuditEvent, AuditSink};
use crate::core::account_store::AccountStore;
use crate::types::{Account, LedgerError};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordVerifier};
use std::sync::Arc;
use tracing::info;

/// Password hashing scheme
///
/// Seam for swapping the scheme in tests; production uses [`Argon2Hasher`].
pub trait PasswordHasher: Send + Sync {
    /// Hash a cleartext password into its storable form
    fn hash(&self, password: &str) -> Result<String, LedgerError>;

    /// Check a cleartext password against a stored hash
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id password hashing with per-password random salts
#[derive(Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, LedgerError> {
        use argon2::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|error| LedgerError::storage(format!("password hashing failed: {error}")))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

/// Registers accounts and authenticates logins against the account store
pub struct AuthService {
    accounts: AccountStore,
    hasher: Arc<dyn PasswordHasher>,
    audit: Arc<dyn AuditSink>,
}

impl AuthService {
    pub fn new(
        accounts: AccountStore,
        hasher: Arc<dyn PasswordHasher>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        AuthService {
            accounts,
            hasher,
            audit,
        }
    }

    /// Create an account with a zero balance
    ///
    /// # Errors
    ///
    /// Returns `EmailTaken` if an account is already registered under
    /// `email`.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, LedgerError> {
        info!(email, "registering account");

        let password_hash = self.hasher.hash(password)?;
        self.accounts.create(name, email, &password_hash)
    }

    /// Authenticate by e-mail and password
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for an unknown e-mail and for a wrong
    /// password alike. A wrong password additionally raises a security
    /// audit event; an unknown e-mail identifies no account and raises none.
    pub fn login(&self, email: &str, password: &str) -> Result<Account, LedgerError> {
        let account = self
            .accounts
            .get_by_email(email)
            .map_err(|_| LedgerError::InvalidCredentials)?;

        if !self.hasher.verify(password, &account.password_hash) {
            self.audit.record(&AuditEvent::FailedLogin {
                account: account.id,
                email: email.to_string(),
            });
            return Err(LedgerError::InvalidCredentials);
        }

        info!(account_id = %account.id, "login succeeded");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAudit;
    use crate::core::database::Database;

    /// Cleartext-marker scheme so tests stay fast
    struct StubHasher;

    impl PasswordHasher for StubHasher {
        fn hash(&self, password: &str) -> Result<String, LedgerError> {
            Ok(format!("stub:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            hash == format!("stub:{password}")
        }
    }

    fn service() -> (AuthService, Arc<MemoryAudit>) {
        let audit = Arc::new(MemoryAudit::new());
        let accounts = AccountStore::new(Arc::new(Database::new()));
        let service = AuthService::new(accounts, Arc::new(StubHasher), audit.clone());
        (service, audit)
    }

    #[test]
    fn test_register_stores_hash_not_password() {
        let (service, _) = service();

        let account = service.register("Ada", "ada@example.com", "hunter2").unwrap();

        assert_eq!(account.name, "Ada");
        assert_eq!(account.password_hash, "stub:hunter2");
        assert_ne!(account.password_hash, "hunter2");
    }

    #[test]
    fn test_register_rejects_duplicate_email() {
        let (service, _) = service();
        service.register("Ada", "ada@example.com", "hunter2").unwrap();

        let result = service.register("Imposter", "ada@example.com", "other");

        assert_eq!(result, Err(LedgerError::email_taken("ada@example.com")));
    }

    #[test]
    fn test_login_roundtrip() {
        let (service, _) = service();
        let registered = service.register("Ada", "ada@example.com", "hunter2").unwrap();

        let logged_in = service.login("ada@example.com", "hunter2").unwrap();

        assert_eq!(logged_in.id, registered.id);
    }

    #[test]
    fn test_login_with_wrong_password_is_audited() {
        let (service, audit) = service();
        let account = service.register("Ada", "ada@example.com", "hunter2").unwrap();

        let result = service.login("ada@example.com", "wrong");

        assert_eq!(result, Err(LedgerError::InvalidCredentials));
        assert_eq!(
            audit.events(),
            vec![AuditEvent::FailedLogin {
                account: account.id,
                email: "ada@example.com".to_string(),
            }]
        );
    }

    #[test]
    fn test_login_with_unknown_email_does_not_reveal_absence() {
        let (service, audit) = service();

        let result = service.login("nobody@example.com", "whatever");

        // Same error as a wrong password, and no audit event since no
        // account was identified.
        assert_eq!(result, Err(LedgerError::InvalidCredentials));
        assert!(audit.events().is_empty());
    }

    #[test]
    fn test_argon2_hash_verifies_and_salts() {
        let hasher = Argon2Hasher;

        let first = hasher.hash("hunter2").unwrap();
        let second = hasher.hash("hunter2").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("hunter2", &first));
        assert!(hasher.verify("hunter2", &second));
        assert!(!hasher.verify("wrong", &first));
        assert!(!hasher.verify("hunter2", "not-a-phc-string"));
    }
}
