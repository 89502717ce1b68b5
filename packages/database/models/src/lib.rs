#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Database row types and query parameter definitions.
//!
//! These types represent the shapes of data as stored in and retrieved from
//! the `SQLite` crime database. Field names match the column names of the
//! `Codes`, `Neighborhoods`, and `Incidents` tables so rows serialize to the
//! same JSON keys the REST API exposes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum number of rows returned by a bounded incident query, and the
/// maximum number of feed records ingested per populate run.
pub const MAX_ROWS: usize = 1000;

/// A row from the `Codes` reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    /// Numeric crime code.
    pub code: i64,
    /// Human-readable incident type for this code.
    pub incident_type: String,
}

/// A row from the `Neighborhoods` reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighborhood {
    /// District council number.
    pub neighborhood_number: i64,
    /// Neighborhood display name.
    pub neighborhood_name: String,
}

/// A row from the `Incidents` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique case number.
    pub case_number: String,
    /// When the incident occurred, as stored (`YYYY-MM-DDTHH:MM:SS`).
    pub date_time: String,
    /// Crime code (references `Codes.code`).
    pub code: i64,
    /// Short incident description.
    pub incident: String,
    /// Police grid number.
    pub police_grid: i64,
    /// Neighborhood (references `Neighborhoods.neighborhood_number`).
    pub neighborhood_number: i64,
    /// Block-level address.
    pub block: String,
    /// Latitude, if known. Incidents created through the API have none.
    pub latitude: Option<f64>,
    /// Longitude, if known.
    pub longitude: Option<f64>,
}

/// An integer column value as sent by a client or the feed.
///
/// Form-driven clients often send numbers as strings (`"500"`). Those are
/// passed to the store as text and the `INTEGER` column affinity stores
/// them as integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntegerField {
    /// A JSON number.
    Number(i64),
    /// A JSON string, bound as-is.
    Text(String),
}

/// The fields supplied when creating an incident, either through the API
/// or from the upstream feed.
///
/// Every field is required. Integer columns accept a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIncident {
    /// Unique case number.
    pub case_number: String,
    /// When the incident occurred.
    pub date_time: String,
    /// Crime code.
    pub code: IntegerField,
    /// Short incident description.
    pub incident: String,
    /// Police grid number.
    pub police_grid: IntegerField,
    /// Neighborhood number.
    pub neighborhood_number: IntegerField,
    /// Block-level address.
    pub block: String,
}

/// An incident joined with its code and neighborhood names, as returned by
/// the bounding-box query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleCrime {
    /// Unique case number.
    pub case_number: String,
    /// When the incident occurred.
    pub date_time: String,
    /// Incident type from `Codes`.
    pub incident_type: String,
    /// Short incident description.
    pub incident: String,
    /// Neighborhood name from `Neighborhoods`.
    pub neighborhood_name: String,
    /// Block-level address.
    pub block: String,
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern latitude boundary.
    pub south: f64,
    /// Western longitude boundary.
    pub west: f64,
    /// Northern latitude boundary.
    pub north: f64,
    /// Eastern longitude boundary.
    pub east: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }
}

/// Errors from parsing a `south,west,north,east` bounds string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoundsParseError {
    /// One of the first four components does not start with a number.
    #[error("Invalid coordinate '{0}' in bounds")]
    InvalidCoordinate(String),

    /// The string has fewer than four components.
    #[error("Expected 4 comma-separated coordinates, got {0}")]
    MissingCoordinates(usize),
}

impl FromStr for BoundingBox {
    type Err = BoundsParseError;

    /// Parses `"south,west,north,east"`.
    ///
    /// Only the first four components are read and anything after them is
    /// ignored. Each component is read up to the end of its leading number,
    /// so `45.0abc` is `45.0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut coordinates = [0.0; 4];
        let mut parts = s.split(',');

        for (i, coordinate) in coordinates.iter_mut().enumerate() {
            let part = parts
                .next()
                .ok_or(BoundsParseError::MissingCoordinates(i))?;
            *coordinate = leading_float(part)
                .ok_or_else(|| BoundsParseError::InvalidCoordinate(part.trim().to_string()))?;
        }

        let [south, west, north, east] = coordinates;
        Ok(Self::new(south, west, north, east))
    }
}

/// Parses the longest decimal number at the start of `s`, after leading
/// whitespace. Returns `None` if `s` does not start with one.
fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer_digits = digits_from(end);
    end += integer_digits;

    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = digits_from(end + 1);
        if integer_digits > 0 || fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }

    if integer_digits == 0 && fraction_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent_digits = digits_from(end + 1 + sign);
        if exponent_digits > 0 {
            end += 1 + sign + exponent_digits;
        }
    }

    s[..end].parse().ok()
}
