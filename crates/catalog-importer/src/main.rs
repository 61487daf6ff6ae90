//! CLI for loading OPIS-style fuel-price CSVs into the station catalog and geocoding the
//! resulting rows.

use catalog::{CatalogStore, Database};
use clap::{Parser, Subcommand};
use ext_clients::{GeocoderClient, GeocoderConfig};
use eyre::{Context, Result};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "catalog-importer")]
#[command(about = "Import and geocode fuel station catalog data")]
struct Cli {
    /// Path to the `SQLite` catalog database
    #[arg(long, env = "DATABASE_URL", default_value = "data/catalog.db")]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a fuel-price CSV into the catalog
    Import {
        /// Path to the OPIS-style CSV file
        #[arg(long)]
        csv_path: PathBuf,
        /// Truncate the catalog before loading
        #[arg(long)]
        replace: bool,
    },
    /// Geocode catalog rows that have no coordinates yet
    Geocode {
        /// Maximum number of rows to geocode in this run
        #[arg(long, default_value_t = 500)]
        limit: i64,
        /// Seconds to sleep between geocoding requests
        #[arg(long, default_value_t = 1.0)]
        sleep_seconds: f64,
        /// Re-geocode rows that already have coordinates
        #[arg(long)]
        force: bool,
    },
    /// Print catalog row counts
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let store = open_store(&cli.database_url)?;

    match cli.command {
        Commands::Import { csv_path, replace } => import(&store, &csv_path, replace)?,
        Commands::Geocode { limit, sleep_seconds, force } => {
            geocode(&store, limit, sleep_seconds, force).await?;
        }
        Commands::Stats => stats(&store)?,
    }

    Ok(())
}

fn open_store(database_url: &str) -> Result<CatalogStore> {
    let db = Database::new(database_url).wrap_err("connecting to catalog database")?;
    let store = CatalogStore::new(db);
    store.init_schema().wrap_err("initializing catalog schema")?;
    Ok(store)
}

fn import(store: &CatalogStore, csv_path: &PathBuf, replace: bool) -> Result<()> {
    println!("Reading {}", csv_path.display());
    let file = File::open(csv_path).wrap_err("opening CSV file")?;
    let rows = catalog::normalize_csv(file).wrap_err("normalizing CSV")?;
    println!("Normalized {} unique stations", rows.len());

    if replace {
        println!("Truncating existing catalog");
        store.truncate()?;
    }

    let count = store.upsert(&rows)?;
    println!("Upserted {count} rows");
    Ok(())
}

async fn geocode(store: &CatalogStore, limit: i64, sleep_seconds: f64, force: bool) -> Result<()> {
    let client = GeocoderClient::new(GeocoderConfig::from_env())?;
    let pending = store.rows_needing_geocode(limit, force)?;
    println!("Geocoding {} station(s)", pending.len());

    let mut resolved = 0;
    let mut failed = 0;

    for station in pending {
        let outcome = client.geocode(&station.full_address(), "us").await;
        match outcome {
            Ok((point, _country)) => {
                store.record_geocode_result(station.id, Some((point.latitude, point.longitude)))?;
                resolved += 1;
            }
            Err(e) => {
                eprintln!("Failed to geocode station {}: {e}", station.id);
                store.record_geocode_result(station.id, None)?;
                failed += 1;
            }
        }

        if sleep_seconds > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(sleep_seconds)).await;
        }
    }

    println!("Geocoded {resolved} station(s), {failed} failure(s)");
    Ok(())
}

fn stats(store: &CatalogStore) -> Result<()> {
    let (total, geocoded) = store.counts()?;
    println!("Stations total:    {total}");
    println!("Stations geocoded: {geocoded}");
    Ok(())
}
