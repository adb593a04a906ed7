//! CampusGuide - Campus Navigation & Pharmacy Assistant
//!
//! CLI front end: interactive query loop, catalog sync, and prescription
//! scanning.

use anyhow::Result;
use campusguide::admin::AdminOps;
use campusguide::backend::BackendClient;
use campusguide::catalog::{Catalog, InventoryEntry};
use campusguide::config::Config;
use campusguide::normalizer::QueryNormalizer;
use campusguide::ocr::{self, OcrClient};
use campusguide::router::{RouteResult, Router};
use campusguide::selection::SelectionHandler;
use campusguide::voice::{LineSource, TranscriptSource};
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Search language (e.g. en-US, fr-FR)
    #[arg(short, long)]
    language: Option<String>,

    /// Pull a fresh catalog snapshot from the backend, then exit
    #[arg(long)]
    sync: bool,

    /// OCR a prescription image and report matched medicines, then exit
    #[arg(long)]
    scan: Option<PathBuf>,

    /// Operator: set a stock line as "pharmacy_id,medicine_id,quantity,price"
    #[arg(long, value_name = "LINE")]
    set_stock: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    // Setup logging
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::from_str(&config.log_level).unwrap_or(Level::INFO)
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🧭 CampusGuide v{} starting...", env!("CARGO_PKG_VERSION"));

    let catalog = Arc::new(Catalog::new(PathBuf::from(&config.catalog_db_path))?);
    let language = args
        .language
        .unwrap_or_else(|| config.search_language.clone());

    if args.sync {
        return sync_catalog(&config, &catalog).await;
    }

    if let Some(image) = args.scan {
        return scan_prescription(&config, &catalog, &image).await;
    }

    if let Some(line) = args.set_stock {
        return set_stock(&config, &line).await;
    }

    let normalizer = QueryNormalizer::new(config.voice_corrections.clone());
    let mut router = Router::new(catalog, &language);
    let mut selection = SelectionHandler::new();
    let mut source = LineSource::stdin();

    info!("✅ CampusGuide ready - type a query");
    info!("   Try: 'where is balme library', 'do you have paracetamol'");

    while let Some(transcript) = source.next().await {
        let text = normalizer.normalize(&transcript.text);
        if text.is_empty() {
            continue;
        }

        match router.process(&text, &mut selection) {
            RouteResult::Answer(answer) => println!("{}", answer),
            RouteResult::Results(_) => println!("{}", selection.options_text()),
            RouteResult::Quit => {
                println!("Goodbye.");
                break;
            }
            RouteResult::NotRecognized => {
                println!("Sorry, I didn't catch that. Say 'help' for examples.");
            }
        }
    }

    Ok(())
}

async fn sync_catalog(config: &Config, catalog: &Catalog) -> Result<()> {
    let backend = BackendClient::new(config);
    info!("⬇️ Syncing catalog from {}", config.backend_url);

    let snapshot = backend.fetch_snapshot().await?;
    catalog.replace_snapshot(&snapshot)?;

    let (locations, medicines, pharmacies, inventory) = catalog.counts()?;
    println!(
        "Synced {} locations, {} medicines, {} pharmacies, {} inventory rows.",
        locations, medicines, pharmacies, inventory
    );
    Ok(())
}

async fn set_stock(config: &Config, line: &str) -> Result<()> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        anyhow::bail!("expected pharmacy_id,medicine_id,quantity,price, got '{}'", line);
    }
    let entry = InventoryEntry {
        pharmacy_id: parts[0].parse()?,
        medicine_id: parts[1].parse()?,
        quantity: parts[2].parse()?,
        price: parts[3].parse()?,
        updated_at: chrono::Utc::now().to_rfc3339(),
    };

    let admin = AdminOps::new(BackendClient::new(config), &config.operator_label);
    admin.set_inventory(&entry).await?;
    println!(
        "Stock updated: pharmacy {} medicine {} -> {} units.",
        entry.pharmacy_id, entry.medicine_id, entry.quantity
    );
    Ok(())
}

async fn scan_prescription(config: &Config, catalog: &Catalog, image: &PathBuf) -> Result<()> {
    let client = OcrClient::new(config);
    info!("🔍 Scanning prescription image {}", image.display());

    let text = client.parse_file(image).await?;
    let names = catalog.medicine_names()?;
    if names.is_empty() {
        warn!("Catalog is empty; run --sync first");
    }

    let matches = ocr::match_medicines(&text, &names);
    if matches.is_empty() {
        println!("No known medicines recognized on this prescription.");
        return Ok(());
    }

    for hit in matches {
        println!("{} (matched '{}', {:.0}%)", hit.medicine, hit.source_token, hit.score * 100.0);
        if let Some(medicine) = catalog.get_medicine(&hit.medicine)? {
            for stock in catalog.pharmacies_with_medicine(medicine.id)? {
                println!(
                    "    {} - {} in stock at GHS {:.2}",
                    stock.pharmacy_name, stock.quantity, stock.price
                );
            }
        }
    }
    Ok(())
}
