pub mod pool;
pub mod repository;
pub mod sqlite;

pub use pool::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool exhausted after waiting {waited_secs}s")]
    PoolExhausted { waited_secs: u64 },

    #[error("Connection pool is closed")]
    PoolClosed,

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },
}
