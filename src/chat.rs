//! Chat persistence: session and message lifecycle behind one store.
//!
//! Builds on top of:
//! - `models::{ChatSession, ChatMessage}` (data structs)
//! - `db::repository` (low-level insert/query)
//!
//! Every operation checks out one pooled connection for its own duration
//! and is atomic: multi-row deletions run inside a transaction that rolls
//! back if any step fails.

use crate::db::{repository, ConnectionPool, DatabaseError};
use crate::models::enums::Sender;
use crate::models::{AdminSessionRow, ChatMessage, SessionSummary};

/// Chat history operations over the shared connection pool.
pub struct ChatStore<'a> {
    pool: &'a ConnectionPool,
}

impl<'a> ChatStore<'a> {
    pub fn new(pool: &'a ConnectionPool) -> Self {
        Self { pool }
    }

    /// Open a new session owned by `user_id`, returning its id.
    pub fn create_session(&self, user_id: i64) -> Result<i64, DatabaseError> {
        let session_id = self
            .pool
            .with_conn(|conn| repository::insert_session(conn, user_id))?;
        tracing::debug!(user_id, session_id, "Chat session created");
        Ok(session_id)
    }

    /// Append one message to a session. Fails when the session does not
    /// exist (foreign key violation).
    pub fn append_message(
        &self,
        session_id: i64,
        sender: Sender,
        message: &str,
    ) -> Result<i64, DatabaseError> {
        self.pool
            .with_conn(|conn| repository::insert_message(conn, session_id, sender, message))
    }

    /// Full message history of a session, oldest first. A missing or
    /// deleted session reads as an empty history.
    pub fn get_history(&self, session_id: i64) -> Result<Vec<ChatMessage>, DatabaseError> {
        self.pool
            .with_conn(|conn| repository::get_messages_by_session(conn, session_id))
    }

    /// One user's sessions, newest first.
    pub fn list_sessions(&self, user_id: i64) -> Result<Vec<SessionSummary>, DatabaseError> {
        self.pool
            .with_conn(|conn| repository::list_sessions_for_user(conn, user_id))
    }

    /// Every session in the store joined with its owner's username,
    /// newest first.
    pub fn list_all_sessions(&self) -> Result<Vec<AdminSessionRow>, DatabaseError> {
        self.pool
            .with_conn(|conn| repository::list_all_sessions(conn))
    }

    /// Remove all messages of a session, keeping the session row. Returns
    /// the number of messages removed.
    pub fn delete_messages(&self, session_id: i64) -> Result<usize, DatabaseError> {
        self.pool
            .with_conn(|conn| repository::delete_messages_for_session(conn, session_id))
    }

    /// Remove one session and everything in it. `Ok(false)` when no such
    /// session existed.
    pub fn delete_session(&self, session_id: i64) -> Result<bool, DatabaseError> {
        let deleted = self.pool.with_conn(|conn| {
            let tx = conn.transaction()?;
            repository::delete_messages_for_session(&tx, session_id)?;
            let deleted = repository::delete_session_row(&tx, session_id)?;
            tx.commit()?;
            Ok(deleted > 0)
        })?;
        if deleted {
            tracing::info!(session_id, "Chat session deleted");
        }
        Ok(deleted)
    }

    /// Remove every session of one user, messages included. Returns the
    /// number of sessions removed.
    pub fn delete_all_sessions(&self, user_id: i64) -> Result<usize, DatabaseError> {
        let removed = self.pool.with_conn(|conn| {
            let tx = conn.transaction()?;
            let ids = repository::session_ids_for_user(&tx, user_id)?;
            for id in &ids {
                repository::delete_messages_for_session(&tx, *id)?;
                repository::delete_session_row(&tx, *id)?;
            }
            tx.commit()?;
            Ok(ids.len())
        })?;
        if removed > 0 {
            tracing::info!(user_id, removed, "All chat sessions deleted for user");
        }
        Ok(removed)
    }
}
