//! Per-request database sessions.

use crate::error::ApiError;
use roster_db::DbPool;
use rusqlite::Connection;

/// Runs `op` against one pooled connection on the blocking thread pool.
///
/// The connection is checked out for the duration of `op` only and goes back
/// to the pool when the closure returns, errors, or panics.
pub async fn with_session<T, F>(pool: &DbPool, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection");
            ApiError::InternalServerError(format!("db connection failed: {}", e))
        })?;
        op(&mut *conn)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "db session task join error");
        ApiError::InternalServerError(format!("task join error: {}", e))
    })?
}
