#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the St. Paul crime server.
//!
//! Each list endpoint wraps its rows in a single-key object (`codes`,
//! `neighborhoods`, `incidents`, `crimes`). Keys are `snake_case` to match
//! the database column names clients already know.

use serde::{Deserialize, Serialize};
use stpaul_crime_database_models::{Code, Incident, Neighborhood, VisibleCrime};

/// `GET /codes` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCodes {
    /// Every crime code.
    pub codes: Vec<Code>,
}

/// `GET /neighborhoods` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiNeighborhoods {
    /// Every neighborhood.
    pub neighborhoods: Vec<Neighborhood>,
}

/// `GET /incidents` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiIncidents {
    /// Every incident.
    pub incidents: Vec<Incident>,
}

/// `GET /visible-crimes` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCrimes {
    /// Incidents inside the requested bounds, newest first.
    pub crimes: Vec<VisibleCrime>,
}

/// Query parameters for the visible-crimes endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct VisibleCrimesParams {
    /// Bounding box as `south,west,north,east`.
    pub bounds: String,
}

/// `DELETE /remove-incident` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveIncidentRequest {
    /// Case number of the incident(s) to delete.
    pub case_number: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}
