use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::Sender;
use crate::models::ChatMessage;

pub fn insert_message(
    conn: &Connection,
    session_id: i64,
    sender: Sender,
    message: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO chat_messages (session_id, sender, message) VALUES (?1, ?2, ?3)",
        params![session_id, sender.as_str(), message],
    )?;
    Ok(conn.last_insert_rowid())
}

struct MessageRow {
    id: i64,
    session_id: i64,
    sender: String,
    message: String,
    timestamp: String,
}

/// Messages of a session oldest first. Timestamps tie at second
/// resolution, so id orders messages written in the same second.
pub fn get_messages_by_session(
    conn: &Connection,
    session_id: i64,
) -> Result<Vec<ChatMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, session_id, sender, message, timestamp
         FROM chat_messages
         WHERE session_id = ?1
         ORDER BY timestamp ASC, id ASC",
    )?;

    let rows = stmt.query_map(params![session_id], |row| {
        Ok(MessageRow {
            id: row.get(0)?,
            session_id: row.get(1)?,
            sender: row.get(2)?,
            message: row.get(3)?,
            timestamp: row.get(4)?,
        })
    })?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    Ok(messages)
}

fn message_from_row(row: MessageRow) -> Result<ChatMessage, DatabaseError> {
    let sender = Sender::from_str(&row.sender)?;

    Ok(ChatMessage {
        id: row.id,
        session_id: row.session_id,
        sender,
        message: row.message,
        timestamp: NaiveDateTime::parse_from_str(&row.timestamp, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
    })
}

/// Returns the number of messages removed.
pub fn delete_messages_for_session(
    conn: &Connection,
    session_id: i64,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM chat_messages WHERE session_id = ?1",
        params![session_id],
    )?;
    Ok(deleted)
}
