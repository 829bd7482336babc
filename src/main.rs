mod config;
mod extract;
mod loader;
mod models;
mod pipeline;
mod render;
mod scan;
mod search;
mod storage;
mod utils;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::loader::{load_results_csv, store_name_from_path};
use crate::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "retail-scout", about = "Marketplace sales scanner and retailer price scout", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a store's sold listings and write the qualification CSV
    Scan {
        /// Marketplace store (seller) name
        store: String,
    },

    /// Discover retailer prices for items in a qualification CSV
    Discover {
        /// Path to a previously written {store}_results.csv
        csv: PathBuf,
    },

    /// Full pipeline: scan, qualify, then discover retailer prices
    Run {
        /// Marketplace store (seller) name
        store: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "retail_scout=info,warn",
        1 => "retail_scout=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Scan { store } => {
            let _t = utils::Timer::start(format!("Scan of {}", store));
            let stats = Pipeline::new(config).scan_only(&store).await?;
            info!(
                "Done: {} items checked, {} qualified",
                stats.items_scanned, stats.items_qualified
            );
        }

        Command::Discover { csv } => {
            let store = store_name_from_path(&csv)
                .ok_or_else(|| anyhow!("Expected a {{store}}_results.csv path, got {:?}", csv))?;
            let feed = load_results_csv(&csv)?;
            if feed.is_empty() {
                info!("No feed records in {:?}, nothing to discover", csv);
                return Ok(());
            }

            let _t = utils::Timer::start(format!("Discovery for {}", store));
            let stats = Pipeline::new(config).discover_only(&store, &feed).await?;
            info!(
                "Done: {} items, {} priced offers, {} errors",
                stats.items_qualified, stats.offers_found, stats.errors
            );
        }

        Command::Run { store } => {
            let _t = utils::Timer::start(format!("Full pipeline for {}", store));
            let stats = Pipeline::new(config).run(&store).await?;
            info!(
                "Done: {} items checked, {} qualified, {} priced offers, {} errors",
                stats.items_scanned, stats.items_qualified, stats.offers_found, stats.errors
            );
        }
    }

    Ok(())
}
