//! Bounded SQLite connection pool.
//!
//! Both stores run every operation through `with_conn`: a connection is
//! checked out for the duration of one closure and returned unconditionally
//! afterward, including when the closure fails. Checkout waits a bounded
//! time when all connections are out, then fails with `PoolExhausted`.

use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;

use super::sqlite::open_database;
use super::DatabaseError;

/// Default maximum number of live connections.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// How long `with_conn` waits for a free connection before giving up.
pub const POOL_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

struct PoolState {
    idle: Vec<Connection>,
    /// Connections alive in total, idle or checked out.
    total: usize,
}

/// Bounded pool of reusable connections to one database file.
///
/// The first connection is opened eagerly so migrations run exactly once;
/// further connections are opened on demand up to `max_size`.
pub struct ConnectionPool {
    path: PathBuf,
    state: Mutex<PoolState>,
    available: Condvar,
    max_size: usize,
    checkout_timeout: Duration,
}

impl ConnectionPool {
    /// Open a pool over the database at `path` with the default bounds.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Self::open_with(path, DEFAULT_POOL_SIZE, POOL_CHECKOUT_TIMEOUT)
    }

    /// Open a pool with explicit size and checkout-timeout bounds.
    pub fn open_with(
        path: &Path,
        max_size: usize,
        checkout_timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let first = open_database(path)?;
        tracing::info!(path = %path.display(), max_size, "Connection pool opened");

        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(PoolState {
                idle: vec![first],
                total: 1,
            }),
            available: Condvar::new(),
            max_size: max_size.max(1),
            checkout_timeout,
        })
    }

    /// Run one store operation on a pooled connection.
    ///
    /// The connection goes back to the pool whether or not the closure
    /// succeeds; the closure's error is returned untouched.
    pub fn with_conn<T, F>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&mut Connection) -> Result<T, DatabaseError>,
    {
        let mut conn = self.checkout()?;
        let result = f(&mut conn);
        self.checkin(conn);
        result
    }

    /// Connections currently alive (idle + checked out). Test hook.
    pub fn open_connections(&self) -> usize {
        self.state.lock().map(|s| s.total).unwrap_or(0)
    }

    fn checkout(&self) -> Result<Connection, DatabaseError> {
        let mut state = self.state.lock().map_err(|_| DatabaseError::PoolClosed)?;
        let deadline = Instant::now() + self.checkout_timeout;

        loop {
            if let Some(conn) = state.idle.pop() {
                return Ok(conn);
            }

            if state.total < self.max_size {
                // Reserve the slot before opening so concurrent checkouts
                // cannot overshoot max_size.
                state.total += 1;
                drop(state);
                match open_database(&self.path) {
                    Ok(conn) => return Ok(conn),
                    Err(e) => {
                        if let Ok(mut state) = self.state.lock() {
                            state.total -= 1;
                        }
                        self.available.notify_one();
                        return Err(e);
                    }
                }
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(
                    max_size = self.max_size,
                    "Connection pool exhausted"
                );
                return Err(DatabaseError::PoolExhausted {
                    waited_secs: self.checkout_timeout.as_secs(),
                });
            }

            let (guard, _) = self
                .available
                .wait_timeout(state, deadline - now)
                .map_err(|_| DatabaseError::PoolClosed)?;
            state = guard;
        }
    }

    fn checkin(&self, conn: Connection) {
        if let Ok(mut state) = self.state.lock() {
            state.idle.push(conn);
        }
        self.available.notify_one();
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("path", &self.path)
            .field("max_size", &self.max_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_pool(max_size: usize, timeout: Duration) -> (tempfile::TempDir, ConnectionPool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = ConnectionPool::open_with(&dir.path().join("test.db"), max_size, timeout).unwrap();
        (dir, pool)
    }

    #[test]
    fn open_runs_migrations() {
        let (_dir, pool) = test_pool(2, POOL_CHECKOUT_TIMEOUT);
        let tables = pool
            .with_conn(|conn| crate::db::sqlite::count_tables(conn))
            .unwrap();
        assert_eq!(tables, 4);
    }

    #[test]
    fn with_conn_returns_closure_value() {
        let (_dir, pool) = test_pool(2, POOL_CHECKOUT_TIMEOUT);
        let n: i64 = pool
            .with_conn(|conn| {
                conn.query_row("SELECT 41 + 1", [], |row| row.get(0))
                    .map_err(DatabaseError::Sqlite)
            })
            .unwrap();
        assert_eq!(n, 42);
    }

    #[test]
    fn connection_returned_after_closure_error() {
        let (_dir, pool) = test_pool(1, Duration::from_millis(100));

        let result: Result<(), DatabaseError> = pool.with_conn(|conn| {
            conn.execute("INSERT INTO no_such_table (x) VALUES (1)", [])?;
            Ok(())
        });
        assert!(result.is_err());

        // The single connection must be back in the pool.
        let ok = pool
            .with_conn(|conn| {
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                    .map_err(DatabaseError::Sqlite)
            })
            .unwrap();
        assert_eq!(ok, 1);
    }

    #[test]
    fn sequential_calls_reuse_one_connection() {
        let (_dir, pool) = test_pool(5, POOL_CHECKOUT_TIMEOUT);
        for _ in 0..10 {
            pool.with_conn(|_conn| Ok(())).unwrap();
        }
        assert_eq!(pool.open_connections(), 1);
    }

    #[test]
    fn exhausted_pool_times_out() {
        let (_dir, pool) = test_pool(1, Duration::from_millis(100));
        let pool = Arc::new(pool);

        let holder = {
            let pool = Arc::clone(&pool);
            std::thread::spawn(move || {
                pool.with_conn(|_conn| {
                    std::thread::sleep(Duration::from_millis(500));
                    Ok(())
                })
            })
        };

        // Give the holder time to check out the only connection.
        std::thread::sleep(Duration::from_millis(50));

        let result = pool.with_conn(|_conn| Ok(()));
        match result {
            Err(DatabaseError::PoolExhausted { .. }) => {}
            other => panic!("Expected PoolExhausted, got: {other:?}"),
        }

        holder.join().unwrap().unwrap();

        // Once the holder is done its connection is usable again.
        pool.with_conn(|_conn| Ok(())).unwrap();
    }

    #[test]
    fn waiting_checkout_wakes_when_connection_returns() {
        let (_dir, pool) = test_pool(1, Duration::from_secs(2));
        let pool = Arc::new(pool);

        let holder = {
            let pool = Arc::clone(&pool);
            std::thread::spawn(move || {
                pool.with_conn(|_conn| {
                    std::thread::sleep(Duration::from_millis(150));
                    Ok(())
                })
            })
        };

        std::thread::sleep(Duration::from_millis(50));

        // Blocks until the holder releases, well inside the 2s bound.
        let started = Instant::now();
        pool.with_conn(|_conn| Ok(())).unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));

        holder.join().unwrap().unwrap();
        assert_eq!(pool.open_connections(), 1);
    }

    #[test]
    fn pool_grows_up_to_max_size() {
        let (_dir, pool) = test_pool(3, Duration::from_millis(200));
        let pool = Arc::new(pool);

        let mut handles = Vec::new();
        for _ in 0..3 {
            let pool = Arc::clone(&pool);
            handles.push(std::thread::spawn(move || {
                pool.with_conn(|_conn| {
                    std::thread::sleep(Duration::from_millis(100));
                    Ok(())
                })
            }));
        }
        for h in handles {
            h.join().unwrap().unwrap();
        }

        assert!(pool.open_connections() <= 3);
        assert!(pool.open_connections() >= 1);
    }
}
