//! # Catalog Repository
//!
//! Read-only access to the catalog tables (locations, providers, employees,
//! products). Catalog management lives elsewhere; this core only resolves
//! references and reads the cached stock projection.
//!
//! The `fetch_*` helpers take a raw connection so the ledger and sale
//! repositories can resolve ids inside their own transactions.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DbError, DbResult};
use corte_core::{Employee, Location, Product, Provider};

/// Repository for catalog lookups.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets a location by ID.
    pub async fn get_location(&self, id: &str) -> DbResult<Option<Location>> {
        let mut conn = self.pool.acquire().await?;
        fetch_location(&mut conn, id).await
    }

    /// Gets a location by ID, or `NotFound`.
    pub async fn require_location(&self, id: &str) -> DbResult<Location> {
        self.get_location(id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", id))
    }

    /// Gets a provider by ID.
    pub async fn get_provider(&self, id: &str) -> DbResult<Option<Provider>> {
        let mut conn = self.pool.acquire().await?;
        fetch_provider(&mut conn, id).await
    }

    /// Gets a provider by ID, or `NotFound`.
    pub async fn require_provider(&self, id: &str) -> DbResult<Provider> {
        self.get_provider(id)
            .await?
            .ok_or_else(|| DbError::not_found("Provider", id))
    }

    /// Gets an employee by ID.
    pub async fn get_employee(&self, id: &str) -> DbResult<Option<Employee>> {
        let mut conn = self.pool.acquire().await?;
        fetch_employee(&mut conn, id).await
    }

    /// Gets an employee by ID, or `NotFound`.
    pub async fn require_employee(&self, id: &str) -> DbResult<Employee> {
        self.get_employee(id)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", id))
    }

    /// Gets a product by ID.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Gets a product by ID, or `NotFound`.
    pub async fn require_product(&self, id: &str) -> DbResult<Product> {
        self.get_product(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Lists products, optionally scoped to one location.
    pub async fn list_products(&self, location_id: Option<&str>) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents_per_kg, unit,
                   cached_stock_grams, min_stock_grams, is_available,
                   location_id, provider_id, created_at, updated_at
            FROM products
            WHERE (?1 IS NULL OR location_id = ?1)
            ORDER BY name
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists available products whose cached stock sits at or below their
    /// minimum threshold, for restock alerts.
    ///
    /// Reads the cached projection, not the ledger fold; run
    /// `LedgerRepository::rebuild_cached_stock` first if the cache is
    /// suspect.
    pub async fn low_stock_products(&self, location_id: Option<&str>) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents_per_kg, unit,
                   cached_stock_grams, min_stock_grams, is_available,
                   location_id, provider_id, created_at, updated_at
            FROM products
            WHERE is_available = 1
              AND cached_stock_grams <= min_stock_grams
              AND (?1 IS NULL OR location_id = ?1)
            ORDER BY name
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

// =============================================================================
// Transaction-scoped resolvers
// =============================================================================

pub(crate) async fn fetch_location(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Location>> {
    let location = sqlx::query_as::<_, Location>(
        r#"
        SELECT id, name, address, is_active, created_at
        FROM locations
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(location)
}

pub(crate) async fn fetch_provider(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Provider>> {
    let provider = sqlx::query_as::<_, Provider>(
        r#"
        SELECT id, name, phone, created_at
        FROM providers
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(provider)
}

pub(crate) async fn fetch_employee(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, first_name, last_name, location_id, is_active, created_at
        FROM employees
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(employee)
}

pub(crate) async fn fetch_product(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, price_cents_per_kg, unit,
               cached_stock_grams, min_stock_grams, is_available,
               location_id, provider_id, created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(product)
}

// =============================================================================
// Unit Tests
// =============================================================================
