use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An account row. `secret` holds the encoded salt+hash, never plain text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub secret: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}
