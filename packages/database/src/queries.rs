//! Query functions for crime data.
//!
//! Each function issues a single statement through [`Store::query`] or
//! [`Store::execute`] and decodes the resulting rows into the types from
//! `stpaul_crime_database_models`.

use moosicbox_json_utils::database::ToValue as _;
use stpaul_crime_database_models::{
    BoundingBox, Code, Incident, IntegerField, MAX_ROWS, Neighborhood, NewIncident, VisibleCrime,
};
use switchy_database::{DatabaseValue, Row};

use crate::{DbError, Store};

const INSERT_INCIDENT_SQL: &str = "INSERT INTO Incidents (case_number, date_time, code, incident, police_grid, neighborhood_number, block)
     VALUES (?, ?, ?, ?, ?, ?, ?)";

/// Returns every row of the `Codes` table, in store order.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row cannot be decoded.
pub async fn list_codes(store: &Store) -> Result<Vec<Code>, DbError> {
    let rows = store.query("SELECT * FROM Codes", &[]).await?;

    rows.iter()
        .map(|row| {
            Ok(Code {
                code: row.to_value("code").map_err(conversion("code"))?,
                incident_type: row
                    .to_value("incident_type")
                    .map_err(conversion("incident_type"))?,
            })
        })
        .collect()
}

/// Returns every row of the `Neighborhoods` table, in store order.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row cannot be decoded.
pub async fn list_neighborhoods(store: &Store) -> Result<Vec<Neighborhood>, DbError> {
    let rows = store.query("SELECT * FROM Neighborhoods", &[]).await?;

    rows.iter()
        .map(|row| {
            Ok(Neighborhood {
                neighborhood_number: row
                    .to_value("neighborhood_number")
                    .map_err(conversion("neighborhood_number"))?,
                neighborhood_name: row
                    .to_value("neighborhood_name")
                    .map_err(conversion("neighborhood_name"))?,
            })
        })
        .collect()
}

/// Returns every row of the `Incidents` table, in store order.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row cannot be decoded.
pub async fn list_incidents(store: &Store) -> Result<Vec<Incident>, DbError> {
    let rows = store.query("SELECT * FROM Incidents", &[]).await?;

    rows.iter().map(incident_from_row).collect()
}

/// Inserts one incident. Latitude and longitude are left unset.
///
/// A duplicate `case_number` is rejected by the store and returned as
/// [`DbError::Database`]; there is no upsert.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub async fn insert_incident(store: &Store, incident: &NewIncident) -> Result<(), DbError> {
    store
        .execute(
            INSERT_INCIDENT_SQL,
            &[
                DatabaseValue::String(incident.case_number.clone()),
                DatabaseValue::String(incident.date_time.clone()),
                integer_value(&incident.code),
                DatabaseValue::String(incident.incident.clone()),
                integer_value(&incident.police_grid),
                integer_value(&incident.neighborhood_number),
                DatabaseValue::String(incident.block.clone()),
            ],
        )
        .await?;

    Ok(())
}

/// Row counts of the three tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCounts {
    /// Rows in `Codes`.
    pub codes: i64,
    /// Rows in `Neighborhoods`.
    pub neighborhoods: i64,
    /// Rows in `Incidents`.
    pub incidents: i64,
}

/// Counts the rows of each table in a single query.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or the counts cannot be decoded.
pub async fn table_counts(store: &Store) -> Result<TableCounts, DbError> {
    let rows = store
        .query(
            "SELECT (SELECT COUNT(*) FROM Codes) AS codes,
                    (SELECT COUNT(*) FROM Neighborhoods) AS neighborhoods,
                    (SELECT COUNT(*) FROM Incidents) AS incidents",
            &[],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Count query returned no rows".to_string(),
    })?;

    Ok(TableCounts {
        codes: row.to_value("codes").map_err(conversion("codes"))?,
        neighborhoods: row
            .to_value("neighborhoods")
            .map_err(conversion("neighborhoods"))?,
        incidents: row.to_value("incidents").map_err(conversion("incidents"))?,
    })
}

/// Deletes every incident with the given case number and returns how many
/// rows were removed. Zero is not an error.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub async fn delete_incident(store: &Store, case_number: &str) -> Result<u64, DbError> {
    let deleted = store
        .execute(
            "DELETE FROM Incidents WHERE case_number = ?",
            &[DatabaseValue::String(case_number.to_string())],
        )
        .await?;

    log::debug!("Deleted {deleted} incident(s) with case number {case_number}");

    Ok(deleted)
}

/// Returns the most recent incidents inside `bbox`, joined with their code
/// and neighborhood names, newest first and capped at [`MAX_ROWS`].
///
/// Incidents whose code or neighborhood does not resolve are excluded by the
/// inner joins, as are incidents without coordinates.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row cannot be decoded.
pub async fn visible_crimes(
    store: &Store,
    bbox: &BoundingBox,
) -> Result<Vec<VisibleCrime>, DbError> {
    let sql = format!(
        "SELECT Incidents.case_number, Incidents.date_time, Codes.incident_type, Incidents.incident,
                Neighborhoods.neighborhood_name, Incidents.block
         FROM Incidents
         INNER JOIN Codes ON Incidents.code = Codes.code
         INNER JOIN Neighborhoods ON Incidents.neighborhood_number = Neighborhoods.neighborhood_number
         WHERE Incidents.latitude BETWEEN ? AND ?
             AND Incidents.longitude BETWEEN ? AND ?
         ORDER BY Incidents.date_time DESC
         LIMIT {MAX_ROWS}"
    );

    // Latitude pair first, then longitude, matching the WHERE clause.
    let rows = store
        .query(
            &sql,
            &[
                DatabaseValue::Real64(bbox.south),
                DatabaseValue::Real64(bbox.north),
                DatabaseValue::Real64(bbox.west),
                DatabaseValue::Real64(bbox.east),
            ],
        )
        .await?;

    rows.iter()
        .map(|row| {
            Ok(VisibleCrime {
                case_number: row.to_value("case_number").map_err(conversion("case_number"))?,
                date_time: row.to_value("date_time").map_err(conversion("date_time"))?,
                incident_type: row
                    .to_value("incident_type")
                    .map_err(conversion("incident_type"))?,
                incident: row.to_value("incident").map_err(conversion("incident"))?,
                neighborhood_name: row
                    .to_value("neighborhood_name")
                    .map_err(conversion("neighborhood_name"))?,
                block: row.to_value("block").map_err(conversion("block"))?,
            })
        })
        .collect()
}

fn incident_from_row(row: &Row) -> Result<Incident, DbError> {
    Ok(Incident {
        case_number: row.to_value("case_number").map_err(conversion("case_number"))?,
        date_time: row.to_value("date_time").map_err(conversion("date_time"))?,
        code: row.to_value("code").map_err(conversion("code"))?,
        incident: row.to_value("incident").map_err(conversion("incident"))?,
        police_grid: row.to_value("police_grid").map_err(conversion("police_grid"))?,
        neighborhood_number: row
            .to_value("neighborhood_number")
            .map_err(conversion("neighborhood_number"))?,
        block: row.to_value("block").map_err(conversion("block"))?,
        latitude: row.to_value("latitude").unwrap_or(None),
        longitude: row.to_value("longitude").unwrap_or(None),
    })
}

fn integer_value(field: &IntegerField) -> DatabaseValue {
    match field {
        IntegerField::Number(n) => DatabaseValue::Int64(*n),
        IntegerField::Text(s) => DatabaseValue::String(s.clone()),
    }
}

fn conversion<E: std::fmt::Display>(column: &'static str) -> impl Fn(E) -> DbError {
    move |e| DbError::Conversion {
        message: format!("Failed to parse column '{column}': {e}"),
    }
}
