//! The `User` record and its persistence.
//!
//! A user is a single row in the `user` table keyed by a caller-supplied
//! integer id. The store never updates a row in place: records are created
//! whole, read, and physically deleted.
//!
//! Every function takes a borrowed connection so the caller decides the
//! session scope. Writes run inside their own transaction and are rolled back
//! before an error is returned.

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("user not found: {0}")]
    NotFound(i64),
    #[error("user already exists: {0}")]
    Duplicate(i64),
}

/// A persisted user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct User {
    /// Primary key, chosen by the caller.
    #[schema(example = 1)]
    pub id: i64,
    /// Display name.
    #[serde(rename = "nama")]
    #[schema(example = "Ronggo Widjoyo")]
    pub name: String,
    /// Age in years.
    #[serde(rename = "umur")]
    #[schema(example = 20)]
    pub age: i64,
    /// Free-form address.
    #[serde(rename = "alamat", default)]
    #[schema(example = "Lamongan")]
    pub address: Option<String>,
}

const SELECT_USERS: &str = "SELECT id, nama, umur, alamat FROM user";

/// Lists every user in primary-key order.
pub fn list_users(conn: &Connection) -> Result<Vec<User>, UserError> {
    let mut stmt = conn.prepare(&format!("{SELECT_USERS} ORDER BY id ASC"))?;
    let rows = stmt.query_map([], map_row_to_user)?;
    let mut users = Vec::new();
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

/// Looks up a user by id, returning `None` when absent.
pub fn find_user(conn: &Connection, id: i64) -> Result<Option<User>, UserError> {
    let user = conn
        .query_row(
            &format!("{SELECT_USERS} WHERE id = ?1"),
            [id],
            map_row_to_user,
        )
        .optional()?;
    Ok(user)
}

/// Retrieves a user by id.
pub fn get_user(conn: &Connection, id: i64) -> Result<User, UserError> {
    find_user(conn, id)?.ok_or(UserError::NotFound(id))
}

/// Inserts `user` and returns the row as persisted.
///
/// An existing id is rejected up front. A concurrent insert that wins the
/// race between that check and the write surfaces as the same
/// [`UserError::Duplicate`], taken from SQLite's primary-key constraint.
/// The returned row is read back before the commit, so an `Ok` always
/// describes a committed row and an `Err` never leaves one behind.
pub fn create_user(conn: &mut Connection, user: &User) -> Result<User, UserError> {
    if find_user(conn, user.id)?.is_some() {
        return Err(UserError::Duplicate(user.id));
    }

    let created = insert_user(conn, user)?;
    tracing::debug!(user_id = user.id, "user created");
    Ok(created)
}

fn insert_user(conn: &mut Connection, user: &User) -> Result<User, UserError> {
    // IMMEDIATE takes the write lock up front, so a writer committing in
    // between waits on busy_timeout instead of failing with SQLITE_BUSY.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let written = tx
        .execute(
            "INSERT INTO user (id, nama, umur, alamat) VALUES (?1, ?2, ?3, ?4)",
            params![user.id, user.name, user.age, user.address],
        )
        .map_err(|e| classify_write_error(e, user.id))
        .and_then(|_| get_user(&tx, user.id));

    let created = match written {
        Ok(created) => created,
        Err(e) => {
            if let Err(rollback_err) = tx.rollback() {
                tracing::warn!(user_id = user.id, error = %rollback_err, "rollback failed");
            }
            return Err(e);
        }
    };

    // A failed COMMIT leaves the transaction open; dropping it rolls back.
    tx.commit().map_err(|e| classify_write_error(e, user.id))?;
    Ok(created)
}

/// Deletes the user with `id`.
pub fn delete_user(conn: &mut Connection, id: i64) -> Result<(), UserError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let exists = tx
        .query_row("SELECT 1 FROM user WHERE id = ?1", [id], |_| Ok(()))
        .optional()?
        .is_some();
    if !exists {
        tx.rollback()?;
        return Err(UserError::NotFound(id));
    }

    if let Err(e) = tx.execute("DELETE FROM user WHERE id = ?1", [id]) {
        if let Err(rollback_err) = tx.rollback() {
            tracing::warn!(user_id = id, error = %rollback_err, "rollback failed");
        }
        return Err(UserError::Database(e));
    }
    tx.commit()?;

    tracing::debug!(user_id = id, "user deleted");
    Ok(())
}

fn classify_write_error(err: rusqlite::Error, id: i64) -> UserError {
    if let rusqlite::Error::SqliteFailure(code, _) = &err {
        if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            || code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        {
            return UserError::Duplicate(id);
        }
    }
    UserError::Database(err)
}

fn map_row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        address: row.get(3)?,
    })
}
