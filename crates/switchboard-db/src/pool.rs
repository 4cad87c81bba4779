//! Pooled SQLite connections for call state.
//!
//! Each IVR request checks out its own connection, reloads the call row,
//! writes the call's new menu and hands the connection back. The pool is
//! opened once at startup with [`open_call_database`], which also brings the
//! schema up to date.

use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

use crate::migrations::{run_migrations, MigrationError};

const IN_MEMORY: &str = ":memory:";

/// Runtime tunables for SQLite connection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// How long a request waits on a locked database, and on an exhausted
    /// pool, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Maximum number of requests holding a connection at once.
    pub pool_max_size: u32,
}

impl DbRuntimeSettings {
    fn timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 4,
        }
    }
}

pub type DbPool = Pool<SqliteConnectionManager>;

/// A connection checked out for the duration of one request.
pub type DbConn = PooledConnection<SqliteConnectionManager>;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to open call database {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: r2d2::Error,
    },

    #[error("no database connection available: {0}")]
    Checkout(#[source] r2d2::Error),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Creates a connection pool over `db_path`.
///
/// Every connection runs in WAL mode with foreign keys on and the configured
/// busy timeout. `:memory:` gives each connection a private database, so the
/// pool is held to a single connection there; otherwise calls written on one
/// request would vanish on the next.
///
/// # Errors
///
/// Returns `PoolError::Open` if the first connection cannot be opened or
/// configured.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let max_size = if db_path == IN_MEMORY {
        1
    } else {
        settings.pool_max_size
    };

    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(move |conn| configure_connection(conn, settings.timeout()));

    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(settings.timeout())
        .build(manager)
        .map_err(|source| PoolError::Open {
            path: db_path.to_string(),
            source,
        })?;

    tracing::debug!(path = db_path, max_size, "call database pool created");
    Ok(pool)
}

/// Creates the pool and applies pending migrations on one of its
/// connections.
///
/// # Errors
///
/// Returns `PoolError` if the database cannot be opened or migrated.
pub fn open_call_database(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let pool = create_pool(db_path, settings)?;
    let applied = run_migrations(&*checkout(&pool)?)?;
    if applied > 0 {
        tracing::info!(path = db_path, count = applied, "applied database migrations");
    }
    Ok(pool)
}

/// Checks out a connection for one request.
///
/// # Errors
///
/// Returns `PoolError::Checkout` if no connection frees up within the busy
/// timeout.
pub fn checkout(pool: &DbPool) -> Result<DbConn, PoolError> {
    pool.get().map_err(PoolError::Checkout)
}

fn configure_connection(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    // In-memory databases report "memory" instead of "wal".
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    if mode != "wal" && mode != "memory" {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("failed to set WAL journal mode, got: {mode}")),
        ));
    }
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(busy_timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connections_are_configured_from_settings() {
        let settings = DbRuntimeSettings {
            busy_timeout_ms: 2_500,
            pool_max_size: 1,
        };
        let pool = create_pool(IN_MEMORY, settings).expect("pool creation should succeed");
        let conn = checkout(&pool).expect("should get a connection");

        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .expect("should query foreign_keys");
        assert_eq!(fk, 1);

        let busy_timeout: i64 = conn
            .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
            .expect("should query busy_timeout");
        assert_eq!(busy_timeout, 2_500);
    }

    #[test]
    fn in_memory_pool_is_held_to_one_connection() {
        let pool = create_pool(IN_MEMORY, DbRuntimeSettings::default())
            .expect("pool creation should succeed");
        assert_eq!(pool.max_size(), 1);
    }

    #[test]
    fn in_memory_calls_survive_between_checkouts() {
        let pool = open_call_database(IN_MEMORY, DbRuntimeSettings::default())
            .expect("database should open");

        checkout(&pool)
            .expect("first checkout")
            .execute("INSERT INTO calls (call_sid) VALUES ('CA-mem')", [])
            .expect("insert should succeed");

        let count: i64 = checkout(&pool)
            .expect("second checkout")
            .query_row("SELECT COUNT(*) FROM calls", [], |row| row.get(0))
            .expect("count should succeed");
        assert_eq!(count, 1);
    }

    #[test]
    fn exhausted_pool_times_out_with_checkout_error() {
        let settings = DbRuntimeSettings {
            busy_timeout_ms: 50,
            pool_max_size: 1,
        };
        let pool = create_pool(IN_MEMORY, settings).expect("pool creation should succeed");
        let _held = checkout(&pool).expect("first checkout");

        assert!(matches!(checkout(&pool), Err(PoolError::Checkout(_))));
    }
}
