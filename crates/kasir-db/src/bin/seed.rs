//! # Seed Data Generator
//!
//! Populates the database with a development catalog and, optionally,
//! a batch of sales spread over recent days.
//!
//! ## Usage
//! ```bash
//! # Catalog only, database from kasir.toml / KASIR_DB_PATH
//! cargo run -p kasir-db --bin seed
//!
//! # Explicit database, plus 200 sales over the past week
//! cargo run -p kasir-db --bin seed -- --db ./kasir_dev.db --sales 200 --days 7
//! ```
//!
//! Products are generated from a fixed list of warung staples in a few
//! sizes. Prices and stock are derived from the index, so two runs over an
//! empty database produce the same catalog.

use chrono::{Duration, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use kasir_core::{CartLine, NewProduct};
use kasir_db::{init_tracing, Database, ErrorKind, KasirConfig};

/// Product names for realistic test data.
const PRODUCTS: &[&str] = &[
    "Kopi Susu",
    "Kopi Hitam",
    "Teh Manis",
    "Teh Botol",
    "Air Mineral",
    "Es Jeruk",
    "Indomie Goreng",
    "Indomie Kuah",
    "Roti Bakar",
    "Pisang Goreng",
    "Tahu Isi",
    "Tempe Mendoan",
    "Nasi Uduk",
    "Nasi Goreng",
    "Mie Ayam",
    "Bakso",
    "Kerupuk",
    "Gula Pasir",
    "Minyak Goreng",
    "Telur Ayam",
];

/// Size suffix and price addon in minor units.
const SIZES: &[(&str, i64)] = &[("Kecil", 0), ("Sedang", 2000), ("Besar", 4500)];

#[derive(Debug, Parser)]
#[command(name = "seed")]
#[command(about = "Seed a Kasir database with development data")]
struct Args {
    /// Database file (overrides kasir.toml and KASIR_DB_PATH)
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// Config file (default: platform config dir / kasir.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of products to generate (at most one per name and size)
    #[arg(short, long, default_value_t = 60)]
    count: usize,

    /// Number of random-ish sales to check out after seeding the catalog
    #[arg(short, long, default_value_t = 0)]
    sales: usize,

    /// Spread the seeded sales over this many past days
    #[arg(long, default_value_t = 7)]
    days: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = KasirConfig::load(args.config.clone())?;
    if let Some(db) = &args.db {
        config.database.path = db.clone();
    }
    init_tracing(&config.logging);

    info!(path = %config.database.path.display(), "Seeding database");

    let db = Database::new(config.to_db_config()).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping catalog seed");
    } else {
        seed_catalog(&db, args.count).await?;
    }

    if args.sales > 0 {
        seed_sales(&db, args.sales, args.days.max(1)).await?;
    }

    db.close().await;
    info!("Seed complete");

    Ok(())
}

async fn seed_catalog(db: &Database, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut generated = 0;

    for (seed, (name, (size, addon))) in PRODUCTS
        .iter()
        .flat_map(|name| SIZES.iter().map(move |size| (name, size)))
        .enumerate()
        .take(count)
    {
        db.products().insert(&generate_product(name, size, *addon, seed)).await?;
        generated += 1;
    }

    info!(generated, elapsed = ?start.elapsed(), "Catalog seeded");
    Ok(())
}

/// Generates a single product with deterministic price and stock.
fn generate_product(name: &str, size: &str, price_addon: i64, seed: usize) -> NewProduct {
    // 3000 - 15000 base, rounded to 500
    let base_price = 3000 + ((seed * 1700) % 12_000) as i64 / 500 * 500;
    let stock = 20 + (seed % 81) as i64;

    NewProduct::new(format!("{} {}", name, size), base_price + price_addon, stock)
}

/// Checks out `count` small carts, back-dated across `days` days.
async fn seed_sales(db: &Database, count: usize, days: i64) -> Result<(), Box<dyn std::error::Error>> {
    let products = db.products().list(u32::MAX).await?;
    if products.is_empty() {
        warn!("No products to sell, skipping sales seed");
        return Ok(());
    }

    let engine = db.checkout();
    let now = Utc::now();
    let mut committed = 0;
    let mut sold_out = 0;

    for i in 0..count {
        let first = &products[(i * 7) % products.len()];
        let second = &products[(i * 13 + 5) % products.len()];
        let cart = [
            CartLine::new(first.id, 1 + (i % 3) as i64),
            CartLine::new(second.id, 1),
        ];

        let minutes_back = (i as i64 * 97) % (days * 24 * 60);
        let created_at = now - Duration::minutes(minutes_back);

        match engine.checkout_at(&cart, created_at).await {
            Ok(_) => committed += 1,
            Err(err) if err.kind() == ErrorKind::InsufficientStock => sold_out += 1,
            Err(err) => return Err(err.into()),
        }
    }

    info!(committed, sold_out, "Sales seeded");
    Ok(())
}
