//! Database connection and the two store access primitives.

use std::path::Path;

use switchy_database::{Database, DatabaseValue, Row};
use switchy_database_connection::init_sqlite_rusqlite;

use crate::DbError;

/// Shared handle to the crime database.
///
/// Constructed once at startup and handed to whoever issues statements.
/// Concurrent statements are serialized by the underlying driver; this type
/// adds no locking or transactions of its own.
pub struct Store {
    db: Option<Box<dyn Database>>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl Store {
    /// Wraps an already-open database connection.
    #[must_use]
    pub fn new(db: Box<dyn Database>) -> Self {
        Self { db: Some(db) }
    }

    /// A store with no connection. Every statement fails with
    /// [`DbError::NotConnected`].
    #[must_use]
    pub const fn disconnected() -> Self {
        Self { db: None }
    }

    /// Opens the `SQLite` database at `path` in read-write mode.
    ///
    /// The file must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if the file is missing, or
    /// [`DbError::Open`] if the connection cannot be initialized.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if !path.is_file() {
            return Err(DbError::NotFound(path.to_path_buf()));
        }

        let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Open(e.to_string()))?;

        Ok(Self::new(db))
    }

    /// Returns whether the store holds an open connection.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.db.is_some()
    }

    fn handle(&self) -> Result<&dyn Database, DbError> {
        self.db.as_deref().ok_or(DbError::NotConnected)
    }

    /// Runs a parameterized `SELECT` and returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store is disconnected or the driver
    /// rejects the statement.
    pub async fn query(&self, sql: &str, params: &[DatabaseValue]) -> Result<Vec<Row>, DbError> {
        let rows = self.handle()?.query_raw_params(sql, params).await?;
        Ok(rows)
    }

    /// Runs a parameterized `INSERT`, `UPDATE` or `DELETE`, returning the
    /// number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store is disconnected or the driver
    /// rejects the statement.
    pub async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> Result<u64, DbError> {
        let affected = self.handle()?.exec_raw_params(sql, params).await?;
        Ok(affected)
    }
}
