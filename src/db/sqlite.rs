use std::path::Path;

use rusqlite::Connection;

use super::DatabaseError;

/// Migrations in apply order. Each runs at most once, tracked by the
/// `schema_version` table the first migration creates.
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../resources/migrations/001_initial.sql"))];

/// Open the database file at `path` with pragmas applied and the schema
/// migrated to the latest version.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// In-memory equivalent of `open_database`, for tests.
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Apply every migration newer than the stored schema version.
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current = stored_schema_version(conn);

    for (version, sql) in MIGRATIONS {
        if *version > current {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| DatabaseError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// 0 when no schema exists yet.
fn stored_schema_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        // users + chat_sessions + chat_messages + schema_version = 4
        let count = count_tables(&conn).unwrap();
        assert_eq!(count, 4, "Expected 4 tables, got {count}");
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        // Run migrations again — should not error
        let result = run_migrations(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn foreign_keys_enabled() {
        let conn = open_memory_database().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn sender_check_constraint_enforced() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO users (username, secret) VALUES ('a', 'x')",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO chat_sessions (user_id) VALUES (1)", [])
            .unwrap();

        let result = conn.execute(
            "INSERT INTO chat_messages (session_id, sender, message) VALUES (1, 'admin', 'hi')",
            [],
        );
        assert!(result.is_err(), "CHECK(sender) should reject unknown tags");
    }
}
