#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Store access and queries for the St. Paul crime database.
//!
//! Uses `switchy_database` over `rusqlite`. Every statement is raw SQL with
//! positional `?` parameters, issued through the two [`db::Store`]
//! primitives. The schema itself is managed outside this crate.

pub mod db;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod queries;

use std::path::PathBuf;

pub use db::Store;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The database file does not exist. It is opened read-write and never
    /// created.
    #[error("Database file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The connection could not be initialized.
    #[error("Failed to open database: {0}")]
    Open(String),

    /// The store has no open connection.
    #[error("Database is not connected")]
    NotConnected,

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
