//! # Seed Data Generator
//!
//! Populates the database with a demo butcher-shop catalog for development:
//! two branches, their employees and providers, a cuts catalog per branch,
//! and an opening inbound movement per product so stock queries have data.
//!
//! ## Usage
//! ```bash
//! cargo run -p corte-db --bin seed
//!
//! # Specify database path
//! cargo run -p corte-db --bin seed -- --db ./data/corte.db
//! ```

use chrono::Utc;
use std::env;
use uuid::Uuid;

use corte_core::{MovementKind, NewMovement};
use corte_db::{Database, DbConfig};

/// Branches to create: (name, address).
const LOCATIONS: &[(&str, &str)] = &[
    ("Centro", "Av. Principal 100"),
    ("Norte", "Calle Mercado 42"),
];

/// Providers shared by both branches.
const PROVIDERS: &[(&str, &str)] = &[
    ("Frigorífico Sur", "+54 11 4000 1000"),
    ("Granja El Alba", "+54 11 4000 2000"),
];

/// One employee per branch: (first, last).
const EMPLOYEES: &[(&str, &str)] = &[("Ana", "Pérez"), ("Luis", "Gómez")];

/// Cuts catalog: (name, price cents/kg, opening stock grams, min grams).
const PRODUCTS: &[(&str, i64, i64, i64)] = &[
    ("Asado", 955, 50_000, 5_000),
    ("Vacío", 1_120, 30_000, 5_000),
    ("Matambre", 1_040, 20_000, 3_000),
    ("Chorizo", 600, 15_000, 2_000),
    ("Morcilla", 520, 10_000, 2_000),
    ("Pollo entero", 480, 40_000, 8_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./corte_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Corte POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./corte_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Corte POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Skip if the catalog is already populated.
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(db.pool())
        .await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    let mut provider_ids = Vec::new();
    for (name, phone) in PROVIDERS {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO providers (id, name, phone, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&id)
            .bind(name)
            .bind(phone)
            .bind(now)
            .execute(db.pool())
            .await?;
        provider_ids.push(id);
    }
    println!("✓ Created {} providers", provider_ids.len());

    let mut movements = 0;
    for (branch_idx, (loc_name, address)) in LOCATIONS.iter().enumerate() {
        let location_id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO locations (id, name, address, is_active, created_at) VALUES (?1, ?2, ?3, 1, ?4)",
        )
        .bind(&location_id)
        .bind(loc_name)
        .bind(address)
        .bind(now)
        .execute(db.pool())
        .await?;

        let (first, last) = EMPLOYEES[branch_idx % EMPLOYEES.len()];
        let employee_id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO employees (id, first_name, last_name, location_id, is_active, created_at) VALUES (?1, ?2, ?3, ?4, 1, ?5)",
        )
        .bind(&employee_id)
        .bind(first)
        .bind(last)
        .bind(&location_id)
        .bind(now)
        .execute(db.pool())
        .await?;

        for (prod_idx, (name, price_cents, opening_grams, min_grams)) in
            PRODUCTS.iter().enumerate()
        {
            let product_id = Uuid::new_v4().to_string();
            let provider_id = &provider_ids[prod_idx % provider_ids.len()];
            sqlx::query(
                r#"
                INSERT INTO products (
                    id, name, price_cents_per_kg, unit,
                    cached_stock_grams, min_stock_grams, is_available,
                    location_id, provider_id, created_at, updated_at
                ) VALUES (?1, ?2, ?3, 'kg', 0, ?4, 1, ?5, ?6, ?7, ?7)
                "#,
            )
            .bind(&product_id)
            .bind(name)
            .bind(price_cents)
            .bind(min_grams)
            .bind(&location_id)
            .bind(provider_id)
            .bind(now)
            .execute(db.pool())
            .await?;

            // Opening stock arrives through the ledger, never by editing
            // the cached column directly.
            db.ledger()
                .record(NewMovement {
                    kind: MovementKind::Inbound,
                    weight_grams: *opening_grams,
                    product_id,
                    location_id: location_id.clone(),
                    employee_id: employee_id.clone(),
                    provider_id: Some(provider_id.clone()),
                })
                .await?;
            movements += 1;
        }

        println!(
            "✓ Branch '{}': {} products with opening stock",
            loc_name,
            PRODUCTS.len()
        );
    }

    println!();
    println!("✓ Recorded {} opening movements", movements);
    println!("✓ Seed complete!");

    Ok(())
}
