//! Scratch databases for tests.
//!
//! Builds a throwaway `SQLite` file from `db/schema.sql` and seeds the
//! reference tables.

use std::path::PathBuf;

use switchy_database::DatabaseValue;
use switchy_database_connection::init_sqlite_rusqlite;
use tempfile::TempDir;

use crate::{DbError, Store};

/// Reference copy of the externally managed schema.
pub const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../db/schema.sql"));

/// Seeded `Codes` rows.
pub const CODES: &[(i64, &str)] = &[
    (110, "Murder, Non Negligent Manslaughter"),
    (500, "Burglary"),
    (600, "Theft"),
];

/// Seeded `Neighborhoods` rows.
pub const NEIGHBORHOODS: &[(i64, &str)] = &[
    (1, "Conway/Battlecreek/Highwood"),
    (7, "Thomas/Dale(Frogtown)"),
    (17, "Capitol River"),
];

/// A seeded database living in a temporary directory.
///
/// The directory (and the file) are removed when this value is dropped.
pub struct ScratchStore {
    /// Keeps the temporary directory alive.
    pub dir: TempDir,
    /// Path of the `SQLite` file.
    pub path: PathBuf,
    /// Open store on `path`.
    pub store: Store,
}

/// Creates a fresh database with the schema applied and reference tables
/// seeded. `Incidents` starts empty.
///
/// # Errors
///
/// Returns [`DbError`] if the file cannot be created or any statement fails.
pub async fn scratch_store() -> Result<ScratchStore, DbError> {
    let dir = tempfile::tempdir().map_err(|e| DbError::Open(e.to_string()))?;
    let path = dir.path().join("stpaul_crime.sqlite3");

    let db = init_sqlite_rusqlite(Some(&path)).map_err(|e| DbError::Open(e.to_string()))?;

    // Scratch data; skip fsync so bulk-insert tests stay fast.
    db.exec_raw("PRAGMA synchronous = OFF").await?;

    for statement in SCHEMA_SQL
        .split(';')
        .map(strip_comments)
        .filter(|s| !s.is_empty())
    {
        db.exec_raw(&statement).await?;
    }

    let store = Store::new(db);

    for (code, incident_type) in CODES {
        store
            .execute(
                "INSERT INTO Codes (code, incident_type) VALUES (?, ?)",
                &[
                    DatabaseValue::Int64(*code),
                    DatabaseValue::String((*incident_type).to_string()),
                ],
            )
            .await?;
    }

    for (number, name) in NEIGHBORHOODS {
        store
            .execute(
                "INSERT INTO Neighborhoods (neighborhood_number, neighborhood_name) VALUES (?, ?)",
                &[
                    DatabaseValue::Int64(*number),
                    DatabaseValue::String((*name).to_string()),
                ],
            )
            .await?;
    }

    Ok(ScratchStore { dir, path, store })
}

/// Inserts an incident with coordinates, which the public insert path never
/// sets.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub async fn insert_located_incident(
    store: &Store,
    case_number: &str,
    date_time: &str,
    latitude: f64,
    longitude: f64,
) -> Result<(), DbError> {
    store
        .execute(
            "INSERT INTO Incidents (case_number, date_time, code, incident, police_grid, neighborhood_number, block, latitude, longitude)
             VALUES (?, ?, 600, 'Theft', 87, 7, '98X UNIVERSITY AV W', ?, ?)",
            &[
                DatabaseValue::String(case_number.to_string()),
                DatabaseValue::String(date_time.to_string()),
                DatabaseValue::Real64(latitude),
                DatabaseValue::Real64(longitude),
            ],
        )
        .await?;

    Ok(())
}

fn strip_comments(chunk: &str) -> String {
    chunk
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
