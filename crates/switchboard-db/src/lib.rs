//! Database layer for Switchboard.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! and embedded SQL migrations. The only durable state the IVR core needs is
//! the current menu of each call, which lives in the `calls` table created
//! here.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{
    checkout, create_pool, open_call_database, DbConn, DbPool, DbRuntimeSettings, PoolError,
};
