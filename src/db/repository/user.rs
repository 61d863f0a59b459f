use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::User;

pub fn insert_user(
    conn: &Connection,
    username: &str,
    secret_hash: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO users (username, secret) VALUES (?1, ?2)",
        params![username, secret_hash],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<User>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, username, secret, is_active, created_at FROM users WHERE username = ?1",
        params![username],
        |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                secret: row.get(2)?,
                is_active: row.get(3)?,
                created_at: NaiveDateTime::parse_from_str(
                    &row.get::<_, String>(4)?,
                    "%Y-%m-%d %H:%M:%S",
                )
                .unwrap_or_default(),
            })
        },
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Id of the active row for a username, if any.
pub fn get_active_user_id(
    conn: &Connection,
    username: &str,
) -> Result<Option<i64>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id FROM users WHERE username = ?1 AND is_active = 1",
        params![username],
        |row| row.get::<_, i64>(0),
    );

    match result {
        Ok(id) => Ok(Some(id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Bring a deactivated row back to life with a fresh secret.
/// Only matches inactive rows; returns whether one was changed.
pub fn reactivate_user(
    conn: &Connection,
    username: &str,
    secret_hash: &str,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE users SET secret = ?1, is_active = 1, created_at = CURRENT_TIMESTAMP
         WHERE username = ?2 AND is_active = 0",
        params![secret_hash, username],
    )?;
    Ok(changed > 0)
}

/// Soft delete: flip is_active off. Returns whether an active row was matched.
pub fn deactivate_user(conn: &Connection, username: &str) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE users SET is_active = 0 WHERE username = ?1 AND is_active = 1",
        params![username],
    )?;
    Ok(changed > 0)
}
