//! # Sale Repository
//!
//! Atomic sale creation, idempotent cancellation and sale lookups.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE (one transaction)                                           │
//! │     └── validate lines (weights, prices, subtotal check)               │
//! │     └── resolve employee, location, every product                      │
//! │     └── INSERT sale header + items (name/price snapshots)              │
//! │     └── policy Automatic: one outbound movement per item              │
//! │                                                                         │
//! │  2. CANCEL (one transaction, idempotent)                               │
//! │     └── UPDATE ... SET cancelled = 1 WHERE cancelled = 0  (CAS)        │
//! │     └── 0 rows → already cancelled → no-op outcome                     │
//! │     └── policy Automatic: compensating inbound per item               │
//! │                                                                         │
//! │  There is no persisted draft state and no partial sale: a sale is      │
//! │  visible only once fully committed with all of its items.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::catalog;
use crate::repository::ledger;
use corte_core::{
    validation, CancelOutcome, MovementKind, NewSale, Sale, SaleDetail, SaleItem, StockMovement,
    StockPolicy,
};

/// Repository for sale transactions.
///
/// The stock policy is injected at construction (see
/// [`crate::pool::DbConfig`]) and applied uniformly to creation and
/// cancellation.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    policy: StockPolicy,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool, policy: StockPolicy) -> Self {
        SaleRepository { pool, policy }
    }

    /// Creates a sale with all of its items, atomically.
    ///
    /// ## Verification
    /// Each line's caller-supplied subtotal is recomputed server-side as
    /// `round(weight × unit price)` and rejected if it differs by more than
    /// one cent. The accepted subtotal is the caller's figure (what the
    /// customer was shown), frozen forever on the item row.
    ///
    /// ## Stock Coupling
    /// Under `StockPolicy::Automatic`, one outbound movement per item is
    /// appended to the ledger in the same transaction, keyed by the item id
    /// so a retry can never double-decrement. Under `Manual` the ledger is
    /// untouched.
    pub async fn create(&self, input: NewSale) -> DbResult<SaleDetail> {
        validation::validate_new_sale(&input)?;

        let mut tx = self.pool.begin().await?;

        let employee = catalog::fetch_employee(&mut tx, &input.employee_id)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", &input.employee_id))?;
        let location = catalog::fetch_location(&mut tx, &input.location_id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", &input.location_id))?;

        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            employee_id: input.employee_id,
            location_id: input.location_id,
            cancelled: false,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (id, employee_id, location_id, cancelled, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.employee_id)
        .bind(&sale.location_id)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let product = catalog::fetch_product(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;
            if !product.is_available {
                return Err(DbError::not_found("Product (available)", &line.product_id));
            }

            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                // Snapshot pattern: the name is frozen so tickets and
                // reports survive later catalog edits.
                name_snapshot: product.name.clone(),
                weight_grams: line.weight_grams,
                unit_price_cents: line.unit_price_cents,
                subtotal_cents: line.subtotal_cents,
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, name_snapshot,
                    weight_grams, unit_price_cents, subtotal_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.weight_grams)
            .bind(item.unit_price_cents)
            .bind(item.subtotal_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            if self.policy == StockPolicy::Automatic {
                let movement = StockMovement {
                    id: Uuid::new_v4().to_string(),
                    kind: MovementKind::Outbound,
                    weight_grams: item.weight_grams,
                    product_id: item.product_id.clone(),
                    location_id: sale.location_id.clone(),
                    employee_id: sale.employee_id.clone(),
                    provider_id: None,
                    sale_item_id: Some(item.id.clone()),
                    recorded_at: now,
                };
                ledger::append_movement(&mut tx, &movement).await?;
                if sale.location_id == product.location_id {
                    ledger::apply_cache_delta(
                        &mut tx,
                        &item.product_id,
                        &sale.location_id,
                        -item.weight_grams,
                    )
                    .await?;
                }
            }

            items.push(item);
        }

        tx.commit().await?;

        info!(
            id = %sale.id,
            items = items.len(),
            policy = ?self.policy,
            "Created sale"
        );

        Ok(SaleDetail {
            sale,
            items,
            employee,
            location,
        })
    }

    /// Cancels a sale. Idempotent: cancelling an already-cancelled sale is
    /// a successful no-op, distinguished in the returned outcome.
    ///
    /// The cancellation flag is flipped with a compare-and-set
    /// (`WHERE cancelled = 0`), so exactly one of any number of concurrent
    /// cancellations performs the side effects. Under
    /// `StockPolicy::Automatic` the winner appends one compensating inbound
    /// movement per item in the same transaction.
    pub async fn cancel(&self, id: &str) -> DbResult<CancelOutcome> {
        let mut tx = self.pool.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, employee_id, location_id, cancelled, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Sale", id))?;

        let result = sqlx::query(
            r#"
            UPDATE sales SET cancelled = 1
            WHERE id = ?1 AND cancelled = 0
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Lost the CAS (or the sale was already cancelled before this
            // call): the first cancellation already did the work.
            tx.commit().await?;
            debug!(id, "Sale already cancelled, no-op");
            return Ok(CancelOutcome {
                already_cancelled: true,
            });
        }

        if self.policy == StockPolicy::Automatic {
            let items = fetch_items(&mut tx, id).await?;
            let now = Utc::now();
            for item in &items {
                let product = catalog::fetch_product(&mut tx, &item.product_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Product", &item.product_id))?;

                let movement = StockMovement {
                    id: Uuid::new_v4().to_string(),
                    kind: MovementKind::Inbound,
                    weight_grams: item.weight_grams,
                    product_id: item.product_id.clone(),
                    location_id: sale.location_id.clone(),
                    employee_id: sale.employee_id.clone(),
                    provider_id: None,
                    sale_item_id: Some(item.id.clone()),
                    recorded_at: now,
                };
                ledger::append_movement(&mut tx, &movement).await?;
                if sale.location_id == product.location_id {
                    ledger::apply_cache_delta(
                        &mut tx,
                        &item.product_id,
                        &sale.location_id,
                        item.weight_grams,
                    )
                    .await?;
                }
            }
        }

        tx.commit().await?;

        info!(id, "Cancelled sale");
        Ok(CancelOutcome {
            already_cancelled: false,
        })
    }

    /// Gets a sale with its items and resolved references.
    pub async fn get(&self, id: &str) -> DbResult<SaleDetail> {
        let mut conn = self.pool.acquire().await?;

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, employee_id, location_id, cancelled, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Sale", id))?;

        let items = fetch_items(&mut conn, id).await?;
        let employee = catalog::fetch_employee(&mut conn, &sale.employee_id)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", &sale.employee_id))?;
        let location = catalog::fetch_location(&mut conn, &sale.location_id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", &sale.location_id))?;

        Ok(SaleDetail {
            sale,
            items,
            employee,
            location,
        })
    }

    /// Lists non-cancelled sales, newest first, with items and references.
    ///
    /// Cancelled sales stay in the database for audit but are excluded
    /// here, matching the reporting queries.
    pub async fn list_active(&self) -> DbResult<Vec<SaleDetail>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, employee_id, location_id, cancelled, created_at
            FROM sales
            WHERE cancelled = 0
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(sales.len());
        for sale in sales {
            details.push(self.get(&sale.id).await?);
        }
        Ok(details)
    }
}

async fn fetch_items(conn: &mut sqlx::SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(
        r#"
        SELECT id, sale_id, product_id, name_snapshot,
               weight_grams, unit_price_cents, subtotal_cents, created_at
        FROM sale_items
        WHERE sale_id = ?1
        ORDER BY created_at
        "#,
    )
    .bind(sale_id)
    .fetch_all(conn)
    .await?;

    Ok(items)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{new_movement, new_sale, sale_line, seed_catalog, test_db};
    use corte_core::{Money, ValidationError, Weight};

    #[tokio::test]
    async fn test_create_sale_decrements_stock() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;

        // Opening stock: 50 kg of asado.
        db.ledger()
            .record(new_movement(&f, MovementKind::Inbound, 50_000))
            .await
            .unwrap();

        // Sell 10 kg at $9.55/kg.
        let detail = db
            .sales()
            .create(new_sale(&f, vec![sale_line(&f.product_asado, 10_000, 955)]))
            .await
            .unwrap();

        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].name_snapshot, "Asado");
        assert_eq!(detail.total(), Money::from_cents(9_550));

        // Re-queried totals equal the supplied ones.
        let fetched = db.sales().get(&detail.sale.id).await.unwrap();
        assert_eq!(fetched.total(), detail.total());
        assert_eq!(fetched.items.len(), 1);

        let stock = db
            .ledger()
            .current_stock(&f.product_asado, &f.location)
            .await
            .unwrap();
        assert_eq!(stock, Weight::from_kilos(40));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_items() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;

        let err = db.sales().create(new_sale(&f, vec![])).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::Required { .. })
        ));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_subtotal_mismatch() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;

        // 2 kg at $9.55/kg is $19.10; claim $18.00.
        let mut line = sale_line(&f.product_asado, 2_000, 955);
        line.subtotal_cents = 1_800;

        let err = db.sales().create(new_sale(&f, vec![line])).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::SubtotalMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_is_atomic_on_bad_product() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;

        let lines = vec![
            sale_line(&f.product_asado, 1_000, 955),
            sale_line(&Uuid::new_v4().to_string(), 500, 600),
        ];
        let err = db.sales().create(new_sale(&f, lines)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // The first line must not survive the failed transaction.
        assert!(db.sales().list_active().await.unwrap().is_empty());
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
        let stock = db
            .ledger()
            .current_stock(&f.product_asado, &f.location)
            .await
            .unwrap();
        assert_eq!(stock, Weight::zero());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_compensates() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;

        db.ledger()
            .record(new_movement(&f, MovementKind::Inbound, 20_000))
            .await
            .unwrap();
        let detail = db
            .sales()
            .create(new_sale(&f, vec![sale_line(&f.product_asado, 5_000, 955)]))
            .await
            .unwrap();

        let first = db.sales().cancel(&detail.sale.id).await.unwrap();
        assert!(!first.already_cancelled);

        let second = db.sales().cancel(&detail.sale.id).await.unwrap();
        assert!(second.already_cancelled);

        // The compensation landed exactly once: back to 20 kg, not 25.
        let stock = db
            .ledger()
            .current_stock(&f.product_asado, &f.location)
            .await
            .unwrap();
        assert_eq!(stock, Weight::from_kilos(20));

        let fetched = db.sales().get(&detail.sale.id).await.unwrap();
        assert!(fetched.sale.cancelled);
    }

    #[tokio::test]
    async fn test_concurrent_cancel_single_winner() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;

        let detail = db
            .sales()
            .create(new_sale(&f, vec![sale_line(&f.product_asado, 1_000, 955)]))
            .await
            .unwrap();

        let sales_a = db.sales();
        let sales_b = db.sales();
        let id_a = detail.sale.id.clone();
        let id_b = detail.sale.id.clone();
        let (a, b) = tokio::join!(sales_a.cancel(&id_a), sales_b.cancel(&id_b));
        let (a, b) = (a.unwrap(), b.unwrap());

        // Exactly one winner.
        assert_ne!(a.already_cancelled, b.already_cancelled);

        // Net ledger effect of sale + single compensation is zero.
        let stock = db
            .ledger()
            .current_stock(&f.product_asado, &f.location)
            .await
            .unwrap();
        assert_eq!(stock, Weight::zero());
    }

    #[tokio::test]
    async fn test_cancel_missing_sale_is_not_found() {
        let db = test_db().await;
        seed_catalog(db.pool()).await;

        let err = db.sales().cancel("no-such-sale").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_manual_policy_leaves_ledger_untouched() {
        let db = crate::testutil::test_db_with_policy(StockPolicy::Manual).await;
        let f = seed_catalog(db.pool()).await;

        let detail = db
            .sales()
            .create(new_sale(&f, vec![sale_line(&f.product_asado, 3_000, 955)]))
            .await
            .unwrap();
        db.sales().cancel(&detail.sale.id).await.unwrap();

        let movements = db
            .ledger()
            .list(corte_core::MovementFilter::default())
            .await
            .unwrap();
        assert!(movements.is_empty());
    }

    #[tokio::test]
    async fn test_list_active_excludes_cancelled() {
        let db = test_db().await;
        let f = seed_catalog(db.pool()).await;

        let keep = db
            .sales()
            .create(new_sale(&f, vec![sale_line(&f.product_asado, 1_000, 955)]))
            .await
            .unwrap();
        let drop = db
            .sales()
            .create(new_sale(&f, vec![sale_line(&f.product_chorizo, 500, 600)]))
            .await
            .unwrap();
        db.sales().cancel(&drop.sale.id).await.unwrap();

        let active = db.sales().list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].sale.id, keep.sale.id);
    }
}
