use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::Sender;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: i64,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub session_id: i64,
    pub sender: Sender,
    pub message: String,
    pub timestamp: NaiveDateTime,
}

/// One row of a user's session list (newest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: i64,
    pub created_at: NaiveDateTime,
}

/// Admin listing: every session joined with its owner's username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSessionRow {
    pub session_id: i64,
    pub username: String,
    pub created_at: NaiveDateTime,
}
