//! Shared test fixtures: an in-memory database plus a small seeded catalog
//! (one location, one employee, one provider, two products).

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::pool::{Database, DbConfig};
use corte_core::{Money, MovementKind, NewMovement, NewSale, NewSaleItem, StockPolicy};

/// Ids of the seeded catalog rows.
pub(crate) struct CatalogFixture {
    pub location: String,
    pub provider: String,
    pub employee: String,
    /// $9.55/kg, min stock 5 kg.
    pub product_asado: String,
    /// $6.00/kg, min stock 2 kg.
    pub product_chorizo: String,
}

/// Fresh in-memory database with migrations applied.
pub(crate) async fn test_db() -> Database {
    test_db_with_policy(StockPolicy::Automatic).await
}

pub(crate) async fn test_db_with_policy(policy: StockPolicy) -> Database {
    Database::new(DbConfig::in_memory().stock_policy(policy))
        .await
        .expect("in-memory database")
}

/// Seeds the catalog and returns the generated ids.
pub(crate) async fn seed_catalog(pool: &SqlitePool) -> CatalogFixture {
    let now = Utc::now();
    let fixture = CatalogFixture {
        location: Uuid::new_v4().to_string(),
        provider: Uuid::new_v4().to_string(),
        employee: Uuid::new_v4().to_string(),
        product_asado: Uuid::new_v4().to_string(),
        product_chorizo: Uuid::new_v4().to_string(),
    };

    sqlx::query("INSERT INTO locations (id, name, address, is_active, created_at) VALUES (?1, 'Centro', 'Av. Principal 100', 1, ?2)")
        .bind(&fixture.location)
        .bind(now)
        .execute(pool)
        .await
        .expect("seed location");

    sqlx::query("INSERT INTO providers (id, name, phone, created_at) VALUES (?1, 'Frigorífico Sur', NULL, ?2)")
        .bind(&fixture.provider)
        .bind(now)
        .execute(pool)
        .await
        .expect("seed provider");

    sqlx::query("INSERT INTO employees (id, first_name, last_name, location_id, is_active, created_at) VALUES (?1, 'Ana', 'Pérez', ?2, 1, ?3)")
        .bind(&fixture.employee)
        .bind(&fixture.location)
        .bind(now)
        .execute(pool)
        .await
        .expect("seed employee");

    for (id, name, price, min_grams) in [
        (&fixture.product_asado, "Asado", 955_i64, 5_000_i64),
        (&fixture.product_chorizo, "Chorizo", 600, 2_000),
    ] {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, price_cents_per_kg, unit,
                cached_stock_grams, min_stock_grams, is_available,
                location_id, provider_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, 'kg', 0, ?4, 1, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(price)
        .bind(min_grams)
        .bind(&fixture.location)
        .bind(&fixture.provider)
        .bind(now)
        .execute(pool)
        .await
        .expect("seed product");
    }

    fixture
}

/// Movement input against the seeded asado product.
pub(crate) fn new_movement(f: &CatalogFixture, kind: MovementKind, grams: i64) -> NewMovement {
    NewMovement {
        kind,
        weight_grams: grams,
        product_id: f.product_asado.clone(),
        location_id: f.location.clone(),
        employee_id: f.employee.clone(),
        provider_id: match kind {
            MovementKind::Inbound => Some(f.provider.clone()),
            MovementKind::Outbound => None,
        },
    }
}

/// Sale input from the seeded employee and location.
pub(crate) fn new_sale(f: &CatalogFixture, items: Vec<NewSaleItem>) -> NewSale {
    NewSale {
        employee_id: f.employee.clone(),
        location_id: f.location.clone(),
        items,
    }
}

/// Sale line with the subtotal the register would display.
pub(crate) fn sale_line(product_id: &str, grams: i64, price_cents: i64) -> NewSaleItem {
    NewSaleItem {
        product_id: product_id.to_string(),
        weight_grams: grams,
        unit_price_cents: price_cents,
        subtotal_cents: Money::from_cents(price_cents)
            .subtotal_for(corte_core::Weight::from_grams(grams))
            .cents(),
    }
}
