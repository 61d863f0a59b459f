use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{AdminSessionRow, ChatSession, SessionSummary};

pub fn insert_session(conn: &Connection, user_id: i64) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO chat_sessions (user_id) VALUES (?1)",
        params![user_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_session(
    conn: &Connection,
    session_id: i64,
) -> Result<Option<ChatSession>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, user_id, created_at FROM chat_sessions WHERE id = ?1",
        params![session_id],
        |row| {
            Ok(ChatSession {
                id: row.get(0)?,
                user_id: row.get(1)?,
                created_at: NaiveDateTime::parse_from_str(
                    &row.get::<_, String>(2)?,
                    "%Y-%m-%d %H:%M:%S",
                )
                .unwrap_or_default(),
            })
        },
    );

    match result {
        Ok(session) => Ok(Some(session)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Sessions for one user, newest first. Id breaks ties because
/// CURRENT_TIMESTAMP only has second resolution.
pub fn list_sessions_for_user(
    conn: &Connection,
    user_id: i64,
) -> Result<Vec<SessionSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, created_at FROM chat_sessions
         WHERE user_id = ?1
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows = stmt.query_map(params![user_id], |row| {
        Ok(SessionSummary {
            session_id: row.get(0)?,
            created_at: NaiveDateTime::parse_from_str(
                &row.get::<_, String>(1)?,
                "%Y-%m-%d %H:%M:%S",
            )
            .unwrap_or_default(),
        })
    })?;

    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(row?);
    }
    Ok(sessions)
}

/// Every session joined with its owner's username, newest first.
pub fn list_all_sessions(conn: &Connection) -> Result<Vec<AdminSessionRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT s.id, u.username, s.created_at
         FROM chat_sessions s
         JOIN users u ON u.id = s.user_id
         ORDER BY s.created_at DESC, s.id DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(AdminSessionRow {
            session_id: row.get(0)?,
            username: row.get(1)?,
            created_at: NaiveDateTime::parse_from_str(
                &row.get::<_, String>(2)?,
                "%Y-%m-%d %H:%M:%S",
            )
            .unwrap_or_default(),
        })
    })?;

    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(row?);
    }
    Ok(sessions)
}

pub fn session_ids_for_user(conn: &Connection, user_id: i64) -> Result<Vec<i64>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id FROM chat_sessions WHERE user_id = ?1 ORDER BY id ASC")?;

    let rows = stmt.query_map(params![user_id], |row| row.get::<_, i64>(0))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row?);
    }
    Ok(ids)
}

/// Returns the number of rows removed (0 when the session never existed).
pub fn delete_session_row(conn: &Connection, session_id: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM chat_sessions WHERE id = ?1",
        params![session_id],
    )?;
    Ok(deleted)
}
