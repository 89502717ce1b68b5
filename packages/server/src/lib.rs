#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web REST server for the St. Paul crime database.
//!
//! Serves crime codes, neighborhoods, and incidents from a `SQLite` file,
//! accepts incident inserts and deletes, answers bounding-box queries for
//! the map, and can populate the database from the upstream feed.

pub mod error;
mod handlers;

use std::path::{Path, PathBuf};

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use stpaul_crime_database::Store;
use stpaul_crime_ingest::DEFAULT_FEED_URL;

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8000;

/// Database path used when `DATABASE_PATH` is unset.
pub const DEFAULT_DATABASE_PATH: &str = "db/stpaul_crime.sqlite3";

/// Shared application state.
pub struct AppState {
    /// Crime database. May be disconnected if it failed to open at startup.
    pub store: Store,
    /// HTTP client for the upstream feed.
    pub http: reqwest::Client,
    /// Upstream feed URL.
    pub feed_url: String,
}

impl AppState {
    /// Creates application state around an opened (or disconnected) store.
    #[must_use]
    pub fn new(store: Store, feed_url: impl Into<String>) -> Self {
        Self {
            store,
            http: reqwest::Client::new(),
            feed_url: feed_url.into(),
        }
    }
}

/// Server settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to listen on (`PORT`).
    pub port: u16,
    /// Path of the `SQLite` database (`DATABASE_PATH`).
    pub database_path: PathBuf,
    /// Upstream feed URL (`CRIME_FEED_URL`).
    pub feed_url: String,
}

impl ServerConfig {
    /// Reads the configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            database_path: lookup("DATABASE_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH), PathBuf::from),
            feed_url: lookup("CRIME_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
        }
    }
}

/// Opens the crime database, logging the outcome.
///
/// A failure does not stop startup: the returned store is disconnected and
/// every data request answers `500` until the process is restarted with a
/// usable database.
#[must_use]
pub fn open_store(path: &Path) -> Store {
    match Store::open(path) {
        Ok(store) => {
            log::info!("Now connected to {}", path.display());
            store
        }
        Err(e) => {
            log::error!("Error opening {}: {e}", path.display());
            Store::disconnected()
        }
    }
}

/// Registers every route plus the extractor configuration that turns
/// malformed input into `500` responses.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .route("/health", web::get().to(handlers::health))
        .route("/codes", web::get().to(handlers::codes))
        .route("/neighborhoods", web::get().to(handlers::neighborhoods))
        .route("/incidents", web::get().to(handlers::incidents))
        .route("/new-incident", web::put().to(handlers::new_incident))
        .route("/remove-incident", web::delete().to(handlers::remove_incident))
        .route("/visible-crimes", web::get().to(handlers::visible_crimes))
        .route("/populate-crimes", web::get().to(handlers::populate_crimes));
}

/// Starts the crime REST server.
///
/// Opens the database, builds the shared state, and runs the Actix-Web
/// HTTP server until it is stopped. The caller provides the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();

    log::info!("Opening database {}...", config.database_path.display());
    let store = open_store(&config.database_path);

    let state = web::Data::new(AppState::new(store, config.feed_url));

    log::info!("Now listening on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
