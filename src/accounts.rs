//! Credential store: registration, authentication, and soft deletion
//! of user accounts.
//!
//! Accounts are soft-deleted: `deactivate` flips `is_active` off and the
//! row stays behind, which keeps old chat sessions attributable. A later
//! `register` under the same username revives the row in place with a
//! fresh secret.

use thiserror::Error;

use crate::chat::ChatStore;
use crate::crypto::{self, CryptoError};
use crate::db::{repository, ConnectionPool, DatabaseError};

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Account operations over the shared connection pool.
///
/// PBKDF2 is deliberately slow, so hashing and verification always run
/// outside `with_conn`, so no connection is held during key derivation.
pub struct AccountStore<'a> {
    pool: &'a ConnectionPool,
}

impl<'a> AccountStore<'a> {
    pub fn new(pool: &'a ConnectionPool) -> Self {
        Self { pool }
    }

    /// Register a new account, or revive a deactivated one under the same
    /// username. Returns `Ok(false)` when the name is taken by an active
    /// account.
    pub fn register(&self, username: &str, secret: &str) -> Result<bool, AccountError> {
        let existing = self
            .pool
            .with_conn(|conn| repository::get_user_by_username(conn, username))?;

        match existing {
            Some(user) if user.is_active => {
                tracing::info!(username, "Registration rejected: username taken");
                Ok(false)
            }
            Some(_) => {
                let secret_hash = crypto::hash_secret(secret);
                let revived = self
                    .pool
                    .with_conn(|conn| repository::reactivate_user(conn, username, &secret_hash))?;
                // False means a concurrent register got there first.
                if revived {
                    tracing::info!(username, "Account reactivated");
                }
                Ok(revived)
            }
            None => {
                let secret_hash = crypto::hash_secret(secret);
                let inserted = self.pool.with_conn(|conn| {
                    match repository::insert_user(conn, username, &secret_hash) {
                        Ok(_) => Ok(true),
                        // Two registers raced; the other one won the row.
                        Err(DatabaseError::Sqlite(e)) if is_unique_violation(&e) => Ok(false),
                        Err(e) => Err(e),
                    }
                })?;
                if inserted {
                    tracing::info!(username, "Account registered");
                }
                Ok(inserted)
            }
        }
    }

    /// `Ok(true)` only for an active account whose stored hash matches the
    /// candidate secret. Unknown usernames and wrong secrets both come back
    /// `Ok(false)`; errors are reserved for the store being unavailable.
    pub fn authenticate(&self, username: &str, secret: &str) -> Result<bool, AccountError> {
        let user = self
            .pool
            .with_conn(|conn| repository::get_user_by_username(conn, username))?;

        // Connection is already back in the pool from here on. Unresolved
        // usernames still pay the KDF cost so timing stays uniform.
        let Some(user) = user else {
            crypto::dummy_verify(secret);
            return Ok(false);
        };
        if !user.is_active {
            crypto::dummy_verify(secret);
            return Ok(false);
        }

        Ok(crypto::verify_secret(secret, &user.secret)?)
    }

    /// Soft-delete an account. `Ok(true)` iff an active row was changed.
    pub fn deactivate(&self, username: &str) -> Result<bool, AccountError> {
        let changed = self
            .pool
            .with_conn(|conn| repository::deactivate_user(conn, username))?;
        if changed {
            tracing::info!(username, "Account deactivated");
        }
        Ok(changed)
    }

    /// Id of the active account with this username, if any. Sessions and
    /// chat history are keyed by user id, so login flows need this lookup.
    pub fn user_id(&self, username: &str) -> Result<Option<i64>, AccountError> {
        Ok(self
            .pool
            .with_conn(|conn| repository::get_active_user_id(conn, username))?)
    }

    /// Remove an account: purge its chat history, then deactivate. History
    /// must go first, because a later `register` revives the same row and
    /// the reborn account has to start with no sessions attached.
    pub fn remove_account(&self, chat: &ChatStore<'_>, username: &str) -> Result<bool, AccountError> {
        let Some(user_id) = self.user_id(username)? else {
            return Ok(false);
        };
        chat.delete_all_sessions(user_id)?;
        self.deactivate(username)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pool() -> (tempfile::TempDir, ConnectionPool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = ConnectionPool::open(&dir.path().join("accounts.db")).unwrap();
        (dir, pool)
    }

    #[test]
    fn register_rejects_taken_username() {
        let (_dir, pool) = test_pool();
        let accounts = AccountStore::new(&pool);

        assert!(accounts.register("alice", "pw123").unwrap());
        assert!(!accounts.register("alice", "other").unwrap());
    }

    #[test]
    fn authenticate_requires_matching_secret() {
        let (_dir, pool) = test_pool();
        let accounts = AccountStore::new(&pool);

        accounts.register("alice", "pw123").unwrap();

        assert!(accounts.authenticate("alice", "pw123").unwrap());
        assert!(!accounts.authenticate("alice", "pw124").unwrap());
        assert!(!accounts.authenticate("alice", "").unwrap());
    }

    #[test]
    fn authenticate_unknown_username_is_false_not_error() {
        let (_dir, pool) = test_pool();
        let accounts = AccountStore::new(&pool);

        assert!(!accounts.authenticate("nobody", "pw").unwrap());
    }

    #[test]
    fn deactivated_account_no_longer_authenticates() {
        let (_dir, pool) = test_pool();
        let accounts = AccountStore::new(&pool);

        accounts.register("bob", "pw123").unwrap();
        assert!(accounts.deactivate("bob").unwrap());

        assert!(!accounts.authenticate("bob", "pw123").unwrap());
        assert_eq!(accounts.user_id("bob").unwrap(), None);
    }

    #[test]
    fn deactivate_without_active_account_reports_false() {
        let (_dir, pool) = test_pool();
        let accounts = AccountStore::new(&pool);

        assert!(!accounts.deactivate("ghost").unwrap());

        accounts.register("bob", "pw").unwrap();
        accounts.deactivate("bob").unwrap();
        assert!(!accounts.deactivate("bob").unwrap());
    }

    #[test]
    fn register_after_deactivate_revives_the_account() {
        let (_dir, pool) = test_pool();
        let accounts = AccountStore::new(&pool);

        accounts.register("carol", "first-secret").unwrap();
        let old_id = accounts.user_id("carol").unwrap().unwrap();
        accounts.deactivate("carol").unwrap();

        assert!(accounts.register("carol", "second-secret").unwrap());

        // Same row, fresh credentials.
        assert_eq!(accounts.user_id("carol").unwrap(), Some(old_id));
        assert!(accounts.authenticate("carol", "second-secret").unwrap());
        assert!(!accounts.authenticate("carol", "first-secret").unwrap());
    }

    #[test]
    fn stored_secret_is_never_plaintext() {
        let (_dir, pool) = test_pool();
        let accounts = AccountStore::new(&pool);

        accounts.register("dave", "hunter2").unwrap();

        let user = pool
            .with_conn(|conn| repository::get_user_by_username(conn, "dave"))
            .unwrap()
            .unwrap();
        assert_ne!(user.secret, "hunter2");
        assert!(!user.secret.contains("hunter2"));
        assert!(user.secret.contains('$'));
    }

    #[test]
    fn user_id_resolves_only_active_accounts() {
        let (_dir, pool) = test_pool();
        let accounts = AccountStore::new(&pool);

        assert_eq!(accounts.user_id("erin").unwrap(), None);
        accounts.register("erin", "pw").unwrap();
        assert!(accounts.user_id("erin").unwrap().is_some());
    }

    #[test]
    fn removed_account_revives_with_no_history() {
        let (_dir, pool) = test_pool();
        let accounts = AccountStore::new(&pool);
        let chat = ChatStore::new(&pool);

        accounts.register("frank", "pw").unwrap();
        let user_id = accounts.user_id("frank").unwrap().unwrap();
        let session_id = chat.create_session(user_id).unwrap();
        chat.append_message(session_id, crate::models::enums::Sender::User, "hello")
            .unwrap();

        assert!(accounts.remove_account(&chat, "frank").unwrap());
        assert!(!accounts.authenticate("frank", "pw").unwrap());

        assert!(accounts.register("frank", "pw2").unwrap());
        assert_eq!(accounts.user_id("frank").unwrap(), Some(user_id));
        assert!(chat.list_sessions(user_id).unwrap().is_empty());
        assert!(chat.get_history(session_id).unwrap().is_empty());
    }

    #[test]
    fn remove_account_is_a_noop_for_unknown_usernames() {
        let (_dir, pool) = test_pool();
        let accounts = AccountStore::new(&pool);
        let chat = ChatStore::new(&pool);

        assert!(!accounts.remove_account(&chat, "ghost").unwrap());
    }
}
