//! # Demo Data Seeder
//!
//! Provisions demo accounts and replays the basic shop scenario against a
//! real database, printing each account's `/api/info` view.
//!
//! ## Usage
//! ```bash
//! # Use ./coinshop.toml / COINSHOP__* settings
//! cargo run -p coinshop-service --bin seed
//!
//! # Specify database path
//! cargo run -p coinshop-service --bin seed -- --db ./data/shop.db
//!
//! # Explicit config file
//! cargo run -p coinshop-service --bin seed -- --config ./deploy/coinshop.toml
//! ```
//!
//! ## Scenario
//! 1. print the configured catalog
//! 2. alice and bob log in (registered on first login)
//! 3. alice buys a cup
//! 4. alice sends bob 500 coins
//! 5. alice tries to send bob 1000 coins (rejected)

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::info;

use coinshop_db::Database;
use coinshop_service::{telemetry, ServiceError, ShopConfig, ShopService};

const DEMO_PASSWORD: &str = "password";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Coin Shop Demo Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (overrides config)");
                println!("  -c, --config <PATH>   Config file (default: $COINSHOP_CONFIG or ./coinshop.toml)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            other => bail!("unknown argument: {}", other),
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => ShopConfig::load_from(Some(&path)),
        None => ShopConfig::load(),
    }
    .context("failed to load configuration")?;

    if let Some(path) = db_path {
        config.database.path = path;
    }

    telemetry::init_tracing(&config.log);

    println!("Coin Shop Demo Seeder");
    println!("=====================");
    println!("Database: {}", config.database.path.display());
    println!();

    let db = Database::new(config.db_config())
        .await
        .context("failed to open database")?;

    if !db.health_check().await {
        bail!("database is not responding");
    }
    let (total, applied) = db.migration_status().await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied ({}/{})", applied, total);

    let existing = db.users().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} users", existing);
        println!("  Skipping seed to avoid replaying the scenario.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let shop: ShopService = ShopService::from_config(db.clone(), &config)?;

    let catalog = shop.engine().catalog();
    println!("✓ Catalog loaded ({} items)", catalog.len());
    for (item, price) in catalog.items() {
        println!("    {:<12} {}", item, price);
    }

    let policy = shop.identity().policy();
    if !policy.auto_register {
        bail!("auto_register is disabled; demo users cannot be provisioned");
    }

    let alice = shop.authenticate("alice", DEMO_PASSWORD).await?.token;
    let bob = shop.authenticate("bob", DEMO_PASSWORD).await?.token;
    println!("✓ Registered alice and bob ({} each)", policy.starting_balance);

    shop.purchase(&alice, "cup").await?;
    println!("✓ alice bought a cup");

    shop.transfer(&alice, "bob", 500).await?;
    println!("✓ alice sent bob 500 coins");

    match shop.transfer(&alice, "bob", 1000).await {
        Err(ServiceError::InsufficientFunds { available, requested }) => {
            println!("✓ alice could not send {} with only {}", requested, available);
        }
        Ok(()) => bail!("overdraft was accepted"),
        Err(e) => return Err(e.into()),
    }

    println!();
    for (name, token) in [("alice", &alice), ("bob", &bob)] {
        let view = shop.account_info(token).await?;
        println!("{}: {}", name, serde_json::to_string_pretty(&view)?);
    }

    let total_coins = db.ledger().total_balance().await?;
    info!(total = total_coins.amount(), "Seed complete");

    db.close().await;
    Ok(())
}
