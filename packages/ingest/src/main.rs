#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for populating the crime database from the feed.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stpaul_crime_database::{Store, queries};
use stpaul_crime_database_models::MAX_ROWS;
use stpaul_crime_ingest::{DEFAULT_FEED_URL, populate_with_limit};

#[derive(Parser)]
#[command(name = "stpaul_crime_ingest", about = "St. Paul crime feed ingestion tool")]
struct Cli {
    /// Path to the `SQLite` crime database (must already exist)
    #[arg(long, env = "DATABASE_PATH", default_value = "db/stpaul_crime.sqlite3")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the feed and insert its most recent records
    Populate {
        /// Feed URL returning a JSON array of incidents
        #[arg(long, env = "CRIME_FEED_URL", default_value = DEFAULT_FEED_URL)]
        url: String,
        /// Maximum number of records to insert (capped at 1000)
        #[arg(long, default_value_t = MAX_ROWS)]
        limit: usize,
    },
    /// Print row counts for each table
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    let store = Store::open(&cli.db)?;

    match cli.command {
        Commands::Populate { url, limit } => {
            let client = reqwest::Client::new();
            let inserted = populate_with_limit(&store, &client, &url, limit).await?;
            log::info!("Populated {inserted} incident(s) into {}", cli.db.display());
        }
        Commands::Stats => {
            let counts = queries::table_counts(&store).await?;

            println!("Codes:         {}", counts.codes);
            println!("Neighborhoods: {}", counts.neighborhoods);
            println!("Incidents:     {}", counts.incidents);
        }
    }

    Ok(())
}
