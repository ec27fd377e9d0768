//! Price Tracker - cheapest price and promotion lookup over scraped listings
//!
//! `clean` turns raw scrape exports into a deduplicated snapshot; the other
//! subcommands query a snapshot or serve it over HTTP.

use clap::{Parser, Subcommand};
use price_tracker::{
    load_snapshot, run_sources, save_snapshot, CsvRecordSource, QueryEngine, RecordSource,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

/// Snapshot read by the query subcommands unless `--snapshot` is given
const DEFAULT_SNAPSHOT: &str = "all_products_cleaned.csv";

/// Scraped price tracker - cleans listings and answers price queries
#[derive(Parser, Debug)]
#[command(name = "price_tracker")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct SnapshotArg {
    /// Path to the cleaned snapshot file
    #[arg(short, long, default_value = DEFAULT_SNAPSHOT)]
    snapshot: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean raw scrape exports into a deduplicated snapshot
    Clean {
        /// Raw export written by a scraper (repeatable)
        #[arg(short, long = "input", required = true)]
        inputs: Vec<PathBuf>,

        /// Snapshot to write (default: all_products_cleaned_<YYYYMMDD>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the cheapest listing whose name contains PRODUCT
    LowestPrice {
        #[command(flatten)]
        snapshot: SnapshotArg,

        /// Case-insensitive part of the product name
        product: String,
    },
    /// List current promotions grouped by category
    Promotions {
        #[command(flatten)]
        snapshot: SnapshotArg,

        /// Only print the number of promotions per category
        #[arg(long, default_value_t = false)]
        counts: bool,
    },
    /// Compare prices of products sold on several sites
    Compare {
        #[command(flatten)]
        snapshot: SnapshotArg,

        /// Minimum number of sites a product must be priced on
        #[arg(long, default_value_t = 2)]
        min_sites: usize,
    },
    /// Show the price evolution of one product
    History {
        #[command(flatten)]
        snapshot: SnapshotArg,

        /// Exact product name (case-insensitive)
        product: String,
    },
    /// Serve the query API over HTTP
    Serve {
        #[command(flatten)]
        snapshot: SnapshotArg,

        /// Port to listen on
        #[arg(short, long, default_value_t = 5000)]
        port: u16,
    },
}

/// Returns the dated default output name: all_products_cleaned_<YYYYMMDD>.csv
fn default_output_path() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d");
    PathBuf::from(format!("all_products_cleaned_{stamp}.csv"))
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Clean { inputs, output } => {
            let output = output.unwrap_or_else(default_output_path);
            run_clean(inputs, &output).await;
        }
        Command::LowestPrice { snapshot, product } => {
            let engine = open_engine(&snapshot.snapshot);
            match engine.lowest_price(&product) {
                Ok(Some(found)) => print_json(&found),
                Ok(None) => {
                    log::warn!("Product \"{}\" not found", product);
                    process::exit(1);
                }
                Err(e) => {
                    log::error!("{}", e);
                    process::exit(2);
                }
            }
        }
        Command::Promotions { snapshot, counts } => {
            let engine = open_engine(&snapshot.snapshot);
            if counts {
                print_json(&engine.promotion_counts());
            } else {
                print_json(&engine.promotions_by_category());
            }
        }
        Command::Compare {
            snapshot,
            min_sites,
        } => {
            let engine = open_engine(&snapshot.snapshot);
            print_json(&engine.compare_prices(min_sites));
        }
        Command::History { snapshot, product } => {
            let engine = open_engine(&snapshot.snapshot);
            match engine.price_history(&product) {
                Ok(points) => print_json(&points),
                Err(e) => {
                    log::error!("{}", e);
                    process::exit(2);
                }
            }
        }
        Command::Serve { snapshot, port } => {
            let engine = Arc::new(open_engine(&snapshot.snapshot));
            if let Err(e) = price_tracker::web::serve(engine, port).await {
                log::error!("Web server error: {}", e);
                process::exit(1);
            }
        }
    }
}

/// Run one cleaning pass over the raw exports and write the snapshot
async fn run_clean(inputs: Vec<PathBuf>, output: &Path) {
    log::info!("Cleaning {} raw export(s)...", inputs.len());

    let sources: Vec<Arc<dyn RecordSource>> = inputs
        .iter()
        .map(|path| Arc::new(CsvRecordSource::new(path)) as Arc<dyn RecordSource>)
        .collect();

    let outcome = match run_sources(sources).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("Cleaning run aborted: {}", e);
            process::exit(1);
        }
    };

    let rejected = &outcome.report.rejected;
    if rejected.total() > 0 {
        log::info!(
            "Rejected listings: {} empty name, {} placeholder name, {} empty after normalization, {} missing site",
            rejected.empty_name,
            rejected.sentinel_name,
            rejected.empty_after_normalization,
            rejected.missing_site
        );
    }

    if let Err(e) = save_snapshot(&outcome.snapshot, output) {
        log::error!("Failed to write snapshot: {}", e);
        process::exit(1);
    }

    log::info!("Cleaning completed successfully.");
}

/// Load the snapshot once and hand it to a query engine
fn open_engine(path: &Path) -> QueryEngine {
    match load_snapshot(path) {
        Ok(snapshot) => QueryEngine::new(Arc::new(snapshot)),
        Err(e) => {
            log::error!("Failed to load snapshot {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("Failed to serialize result: {}", e);
            process::exit(1);
        }
    }
}
