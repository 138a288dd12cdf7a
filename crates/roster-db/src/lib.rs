//! SQLite storage layer for the roster service.
//!
//! Owns connection pooling (via `r2d2`), per-connection pragmas and the
//! embedded schema. Every table the service touches is created by a
//! versioned migration in this crate.
//!
//! Connections are opened in serialized (`FULL_MUTEX`) mode so a pooled
//! handle can be checked out and used from whichever blocking worker serves
//! the request.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
