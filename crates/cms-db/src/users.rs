use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::models::UserRow;
use crate::{Database, DbError, Result};

impl Database {
    /// Inserts a user whose password has already been hashed.
    /// Fails with `UserExists` when the handle is taken.
    pub fn create_user(&self, handle: &str, password_hash: &str, is_admin: bool) -> Result<i64> {
        self.with_tx(|tx| {
            if query_user_by_handle(tx, handle)?.is_some() {
                return Err(DbError::UserExists(handle.to_string()));
            }

            let inserted = tx
                .execute(
                    "INSERT INTO users (handle, is_admin, password_hash) VALUES (?1, ?2, ?3)",
                    params![handle, is_admin, password_hash],
                )
                .map_err(|e| unique_violation_as_exists(e, handle))?;

            if inserted != 1 {
                return Err(DbError::Inconsistent(format!(
                    "insert of user '{}' affected {} rows",
                    handle, inserted
                )));
            }

            let id = tx.last_insert_rowid();
            debug!("Created user {} ({})", handle, id);
            Ok(id)
        })
    }

    pub fn get_user_by_handle(&self, handle: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_handle(conn, handle))
    }

    pub fn update_password(&self, handle: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE users SET password_hash = ?1 WHERE handle = ?2",
                params![password_hash, handle],
            )?;
            match updated {
                1 => Ok(()),
                0 => Err(DbError::NotFound),
                n => Err(DbError::Inconsistent(format!(
                    "password update for '{}' affected {} rows",
                    handle, n
                ))),
            }
        })
    }

    pub fn list_handles(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT handle FROM users ORDER BY id")?;
            let handles = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(handles)
        })
    }
}

fn query_user_by_handle(conn: &Connection, handle: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, handle, is_admin, password_hash FROM users WHERE handle = ?1")?;

    let row = stmt
        .query_row([handle], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                handle: row.get(1)?,
                is_admin: row.get(2)?,
                password_hash: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// A concurrent signup can slip past the existence check; the UNIQUE
/// constraint still catches it.
fn unique_violation_as_exists(err: rusqlite::Error, handle: &str) -> DbError {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            DbError::UserExists(handle.to_string())
        }
        other => DbError::Sqlite(other),
    }
}
