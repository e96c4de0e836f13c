//! # Report Repository
//!
//! Date-bucketed sales aggregation.
//!
//! One query does all the work: sales joined to their items, grouped by
//! (calendar date, location, employee), cancelled sales excluded. Totals
//! come from the frozen item subtotals, never recomputed from live prices.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use corte_core::{validation, SummaryFilter, SummaryRow};

/// Repository for sales reporting.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Daily sales summary grouped by (date, location, employee), newest
    /// date first.
    ///
    /// ## Semantics
    /// - Cancelled sales are excluded entirely
    /// - The date range is inclusive on both ends
    /// - A product filter restricts which items are summed but keeps the
    ///   grouping by sale date/location/employee
    /// - Groups with no matching items are omitted, never emitted as zeros
    pub async fn daily_summary(&self, filter: SummaryFilter) -> DbResult<Vec<SummaryRow>> {
        validation::validate_range(
            "date range",
            filter.start_date.as_ref(),
            filter.end_date.as_ref(),
        )?;

        let start = filter.start_date.map(|d| d.format("%Y-%m-%d").to_string());
        let end = filter.end_date.map(|d| d.format("%Y-%m-%d").to_string());

        debug!(?start, ?end, "Running daily summary");

        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT
                DATE(s.created_at)                  AS sale_date,
                s.location_id                       AS location_id,
                l.name                              AS location_name,
                s.employee_id                       AS employee_id,
                e.first_name || ' ' || e.last_name  AS employee_name,
                SUM(si.subtotal_cents)              AS total_cents,
                SUM(si.weight_grams)                AS total_grams,
                COUNT(si.id)                        AS item_count
            FROM sales s
            JOIN sale_items si ON si.sale_id = s.id
            JOIN locations l   ON l.id = s.location_id
            JOIN employees e   ON e.id = s.employee_id
            WHERE s.cancelled = 0
              AND (?1 IS NULL OR DATE(s.created_at) >= ?1)
              AND (?2 IS NULL OR DATE(s.created_at) <= ?2)
              AND (?3 IS NULL OR s.location_id = ?3)
              AND (?4 IS NULL OR si.product_id = ?4)
              AND (?5 IS NULL OR s.employee_id = ?5)
            GROUP BY sale_date, s.location_id, s.employee_id
            ORDER BY sale_date DESC, location_name, employee_name
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(filter.location_id)
        .bind(filter.product_id)
        .bind(filter.employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Today's summary (UTC calendar date), optionally scoped to one
    /// location. Convenience wrapper over [`Self::daily_summary`].
    pub async fn today_summary(&self, location_id: Option<String>) -> DbResult<Vec<SummaryRow>> {
        let today: NaiveDate = Utc::now().date_naive();
        self.daily_summary(SummaryFilter {
            start_date: Some(today),
            end_date: Some(today),
            location_id,
            ..Default::default()
        })
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
