//! # Stock Ledger Repository
//!
//! Append-only stock movement ledger and the stock queries derived from it.
//!
//! ## Ledger Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stock Ledger                                     │
//! │                                                                         │
//! │  record(NewMovement)                                                    │
//! │       │  validate → resolve ids → INSERT movement                      │
//! │       │           → cached_stock += sign × weight  (owning location)   │
//! │       │  all in one transaction                                        │
//! │       ▼                                                                 │
//! │  stock_movements (INSERT only, no UPDATE/DELETE)                       │
//! │       │                                                                 │
//! │       ├── current_stock(product, location)                             │
//! │       │     = SUM(inbound) − SUM(outbound) over the partition          │
//! │       │                                                                 │
//! │       └── rebuild_cached_stock(product)                                 │
//! │             re-derives products.cached_stock_grams from the fold       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The fold over movements is the single source of truth for stock. The
//! cached column on products is a projection of it, maintained in the same
//! transaction as every insert and repairable at any time.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::catalog;
use corte_core::{validation, MovementFilter, NewMovement, StockMovement, Weight};

/// Repository for the append-only stock ledger.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Records a stock movement.
    ///
    /// ## What This Does
    /// 1. Validates the input (positive weight, well-formed ids)
    /// 2. Resolves product, location, employee and provider references
    /// 3. Inserts the movement row
    /// 4. Applies the signed delta to the product's cached stock, when the
    ///    movement is at the product's owning location
    ///
    /// Steps 3 and 4 run in one transaction, so the cache can never drift
    /// from the ledger by a committed movement.
    pub async fn record(&self, input: NewMovement) -> DbResult<StockMovement> {
        validation::validate_movement(&input)?;

        let mut tx = self.pool.begin().await?;

        let product = catalog::fetch_product(&mut tx, &input.product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &input.product_id))?;
        catalog::fetch_location(&mut tx, &input.location_id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", &input.location_id))?;
        catalog::fetch_employee(&mut tx, &input.employee_id)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", &input.employee_id))?;
        if let Some(provider_id) = &input.provider_id {
            catalog::fetch_provider(&mut tx, provider_id)
                .await?
                .ok_or_else(|| DbError::not_found("Provider", provider_id))?;
        }

        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            kind: input.kind,
            weight_grams: input.weight_grams,
            product_id: input.product_id,
            location_id: input.location_id,
            employee_id: input.employee_id,
            provider_id: input.provider_id,
            sale_item_id: None,
            recorded_at: Utc::now(),
        };

        append_movement(&mut tx, &movement).await?;
        if movement.location_id == product.location_id {
            apply_cache_delta(
                &mut tx,
                &movement.product_id,
                &movement.location_id,
                movement.kind.sign() * movement.weight_grams,
            )
            .await?;
        }

        tx.commit().await?;

        debug!(
            id = %movement.id,
            kind = ?movement.kind,
            grams = movement.weight_grams,
            product_id = %movement.product_id,
            "Recorded stock movement"
        );

        Ok(movement)
    }

    /// Current on-hand stock for (product, location), folded from the
    /// ledger. This is the authoritative figure.
    pub async fn current_stock(&self, product_id: &str, location_id: &str) -> DbResult<Weight> {
        let grams: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(CASE WHEN kind = 'inbound'
                            THEN weight_grams
                            ELSE -weight_grams END)
            FROM stock_movements
            WHERE product_id = ?1 AND location_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Weight::from_grams(grams.unwrap_or(0)))
    }

    /// Lists movements matching the filter, newest first.
    ///
    /// Every filter field is optional; the date range is inclusive on both
    /// ends.
    pub async fn list(&self, filter: MovementFilter) -> DbResult<Vec<StockMovement>> {
        validation::validate_range("recorded_at", filter.from.as_ref(), filter.to.as_ref())?;

        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, kind, weight_grams, product_id, location_id,
                   employee_id, provider_id, sale_item_id, recorded_at
            FROM stock_movements
            WHERE (?1 IS NULL OR product_id = ?1)
              AND (?2 IS NULL OR location_id = ?2)
              AND (?3 IS NULL OR recorded_at >= ?3)
              AND (?4 IS NULL OR recorded_at <= ?4)
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.location_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Re-derives a product's cached stock from the ledger fold at its
    /// owning location, and returns the repaired figure.
    ///
    /// The cache is maintained transactionally by `record` and by sale
    /// creation/cancellation, so under normal operation this is a no-op
    /// repair tool (after a restored backup, or a manual DB edit).
    pub async fn rebuild_cached_stock(&self, product_id: &str) -> DbResult<Weight> {
        let mut tx = self.pool.begin().await?;

        let product = catalog::fetch_product(&mut tx, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        let grams: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(CASE WHEN kind = 'inbound'
                            THEN weight_grams
                            ELSE -weight_grams END)
            FROM stock_movements
            WHERE product_id = ?1 AND location_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(&product.location_id)
        .fetch_one(&mut *tx)
        .await?;
        let grams = grams.unwrap_or(0);

        sqlx::query(
            r#"
            UPDATE products
            SET cached_stock_grams = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(grams)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(product_id, grams, "Rebuilt cached stock from ledger");
        Ok(Weight::from_grams(grams))
    }
}

// =============================================================================
// Transaction-scoped writers
// =============================================================================
// Shared with the sale repository, which appends sale-driven movements
// inside its own sale transaction.

pub(crate) async fn append_movement(
    conn: &mut SqliteConnection,
    movement: &StockMovement,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, kind, weight_grams, product_id, location_id,
            employee_id, provider_id, sale_item_id, recorded_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&movement.id)
    .bind(movement.kind)
    .bind(movement.weight_grams)
    .bind(&movement.product_id)
    .bind(&movement.location_id)
    .bind(&movement.employee_id)
    .bind(&movement.provider_id)
    .bind(&movement.sale_item_id)
    .bind(movement.recorded_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Applies a signed delta to the cached projection. A no-op when the
/// (product, location) pair isn't the owning location; the cache only
/// tracks the owning branch.
pub(crate) async fn apply_cache_delta(
    conn: &mut SqliteConnection,
    product_id: &str,
    location_id: &str,
    delta_grams: i64,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE products
        SET cached_stock_grams = cached_stock_grams + ?3, updated_at = ?4
        WHERE id = ?1 AND location_id = ?2
        "#,
    )
    .bind(product_id)
    .bind(location_id)
    .bind(delta_grams)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{new_movement, seed_catalog, test_db};
    use corte_core::{fold_stock, MovementKind};

    #[tokio::test]
    async fn test_record_and_fold() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;
        let ledger = db.ledger();

        ledger
            .record(new_movement(&f, MovementKind::Inbound, 50_000))
            .await
            .unwrap();
        ledger
            .record(new_movement(&f, MovementKind::Outbound, 10_000))
            .await
            .unwrap();

        let stock = ledger
            .current_stock(&f.product_asado, &f.location)
            .await
            .unwrap();
        assert_eq!(stock, Weight::from_kilos(40));

        // Cached projection tracked the same figure transactionally.
        let product = db.catalog().require_product(&f.product_asado).await.unwrap();
        assert_eq!(product.cached_stock(), stock);
    }

    #[tokio::test]
    async fn test_sql_fold_matches_pure_fold() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;
        let ledger = db.ledger();

        for (kind, grams) in [
            (MovementKind::Inbound, 12_345),
            (MovementKind::Outbound, 2_345),
            (MovementKind::Inbound, 700),
            (MovementKind::Outbound, 9_999),
        ] {
            ledger.record(new_movement(&f, kind, grams)).await.unwrap();
        }

        let movements = ledger
            .list(MovementFilter {
                product_id: Some(f.product_asado.clone()),
                location_id: Some(f.location.clone()),
                ..Default::default()
            })
            .await
            .unwrap();

        let sql_stock = ledger
            .current_stock(&f.product_asado, &f.location)
            .await
            .unwrap();
        assert_eq!(fold_stock(&movements), sql_stock);
        assert_eq!(sql_stock, Weight::from_grams(701));
    }

    #[tokio::test]
    async fn test_record_rejects_nonpositive_weight() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;

        let err = db
            .ledger()
            .record(new_movement(&f, MovementKind::Inbound, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = db
            .ledger()
            .record(new_movement(&f, MovementKind::Outbound, -500))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        // Nothing was written.
        let stock = db
            .ledger()
            .current_stock(&f.product_asado, &f.location)
            .await
            .unwrap();
        assert_eq!(stock, Weight::zero());
    }

    #[tokio::test]
    async fn test_record_unknown_product_writes_nothing() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;

        let mut input = new_movement(&f, MovementKind::Inbound, 1_000);
        input.product_id = uuid::Uuid::new_v4().to_string();

        let err = db.ledger().record(input).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let movements = db.ledger().list(MovementFilter::default()).await.unwrap();
        assert!(movements.is_empty());
    }

    #[tokio::test]
    async fn test_rebuild_cached_stock_repairs_drift() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;
        let ledger = db.ledger();

        ledger
            .record(new_movement(&f, MovementKind::Inbound, 8_000))
            .await
            .unwrap();

        // Corrupt the projection behind the ledger's back.
        sqlx::query("UPDATE products SET cached_stock_grams = 12345 WHERE id = ?1")
            .bind(&f.product_asado)
            .execute(db.pool())
            .await
            .unwrap();

        let repaired = ledger.rebuild_cached_stock(&f.product_asado).await.unwrap();
        assert_eq!(repaired, Weight::from_grams(8_000));

        let product = db.catalog().require_product(&f.product_asado).await.unwrap();
        assert_eq!(product.cached_stock_grams, 8_000);
    }

    #[tokio::test]
    async fn test_list_filters_by_product() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;
        let ledger = db.ledger();

        ledger
            .record(new_movement(&f, MovementKind::Inbound, 3_000))
            .await
            .unwrap();
        let mut other = new_movement(&f, MovementKind::Inbound, 4_000);
        other.product_id = f.product_chorizo.clone();
        ledger.record(other).await.unwrap();

        let all = ledger.list(MovementFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let asado_only = ledger
            .list(MovementFilter {
                product_id: Some(f.product_asado.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(asado_only.len(), 1);
        assert_eq!(asado_only[0].weight_grams, 3_000);
    }
}
