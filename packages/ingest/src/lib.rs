#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Populates the crime database from the upstream incident feed.
//!
//! The feed is a JSON array of incident records. At most [`MAX_ROWS`]
//! records are taken from the front of the array and inserted one at a
//! time. There is no transaction: when record *k* fails, records before it
//! stay committed and the run stops with an error.

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

use std::time::Instant;

use serde::Deserialize as _;
use serde_json::Value;
use stpaul_crime_database::{DbError, Store, queries};
use stpaul_crime_database_models::{MAX_ROWS, NewIncident};
use thiserror::Error;

/// Feed used when none is configured.
pub const DEFAULT_FEED_URL: &str = "https://example.com/api/crimes";

/// Errors from a populate run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The feed could not be fetched or is not a JSON array.
    #[error("Feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A feed record is missing fields or has the wrong types.
    #[error("Feed record {index} is malformed: {source}")]
    Decode {
        /// Zero-based position of the record in the feed.
        index: usize,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// Inserting a record failed.
    #[error("Failed to insert feed record {index}: {source}")]
    Insert {
        /// Zero-based position of the record in the feed.
        index: usize,
        /// Underlying database error.
        source: DbError,
    },
}

/// Fetches the feed and returns its records undecoded.
///
/// # Errors
///
/// Returns [`IngestError::Http`] if the request fails, the server answers
/// with an error status, or the body is not a JSON array.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<Vec<Value>, IngestError> {
    log::info!("Fetching crime feed from {url}");

    let records = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<Value>>()
        .await?;

    log::info!("Feed returned {} record(s)", records.len());

    Ok(records)
}

/// Inserts up to `limit` records (never more than [`MAX_ROWS`]) from the
/// front of `records`, in order, and returns how many were inserted.
///
/// # Errors
///
/// Returns [`IngestError::Decode`] or [`IngestError::Insert`] for the first
/// record that fails. Records before it remain in the database.
pub async fn insert_records(
    store: &Store,
    records: &[Value],
    limit: usize,
) -> Result<u64, IngestError> {
    let mut inserted = 0u64;

    for (index, record) in records.iter().take(limit.min(MAX_ROWS)).enumerate() {
        let incident = NewIncident::deserialize(record)
            .map_err(|source| IngestError::Decode { index, source })?;

        queries::insert_incident(store, &incident)
            .await
            .map_err(|source| IngestError::Insert { index, source })?;

        inserted += 1;
    }

    Ok(inserted)
}

/// Fetches the feed at `url` and inserts its first [`MAX_ROWS`] records.
///
/// # Errors
///
/// Returns [`IngestError`] if the fetch fails or any record fails to decode
/// or insert.
pub async fn populate(
    store: &Store,
    client: &reqwest::Client,
    url: &str,
) -> Result<u64, IngestError> {
    populate_with_limit(store, client, url, MAX_ROWS).await
}

/// Like [`populate`], inserting at most `limit` records.
///
/// # Errors
///
/// Returns [`IngestError`] if the fetch fails or any record fails to decode
/// or insert.
pub async fn populate_with_limit(
    store: &Store,
    client: &reqwest::Client,
    url: &str,
    limit: usize,
) -> Result<u64, IngestError> {
    let start = Instant::now();

    let records = fetch_feed(client, url).await?;
    let inserted = insert_records(store, &records, limit).await?;

    log::info!(
        "Inserted {inserted} incident(s) in {:.1}s",
        start.elapsed().as_secs_f64()
    );

    Ok(inserted)
}
