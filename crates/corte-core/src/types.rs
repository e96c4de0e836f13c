//! # Domain Types
//!
//! Core domain types used throughout Corte POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (read-only here)      Ledger              Sales               │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  StockMovement  │   │      Sale       │       │
//! │  │    Location     │   │  ─────────────  │   │  ─────────────  │       │
//! │  │    Employee     │   │  kind: in/out   │   │  cancelled flag │       │
//! │  │    Provider     │   │  weight_grams   │   │  SaleItem rows  │       │
//! │  └─────────────────┘   │  append-only    │   │  frozen subtotal│       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Reporting: SummaryRow grouped by (date, location, employee)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - Every entity id is a UUID v4 string - immutable, used for relations
//! - Money is integer cents, weight is integer grams (see [`crate::money`],
//!   [`crate::weight`]); row structs carry the raw integers and expose typed
//!   accessors, so the database layer can map them directly
//! - Ledger direction lives in [`MovementKind`], never in the sign of the
//!   weight

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::weight::Weight;

// =============================================================================
// Movement Kind
// =============================================================================

/// Direction of a stock movement.
///
/// Weight values are always positive; this enum carries the sign. An
/// administrative correction is just another movement in the opposite
/// direction, never an update to an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Stock entering the location (restock from a provider, correction up).
    Inbound,
    /// Stock leaving the location (sale consumption, waste, correction down).
    Outbound,
}

impl MovementKind {
    /// Fold sign for this direction: +1 for inbound, -1 for outbound.
    #[inline]
    pub const fn sign(&self) -> i64 {
        match self {
            MovementKind::Inbound => 1,
            MovementKind::Outbound => -1,
        }
    }
}

// =============================================================================
// Stock Policy
// =============================================================================

/// How sale transactions couple to the stock ledger.
///
/// The replaced system was inconsistent: some variants decremented stock on
/// sale, some did not, and cancellation never reversed anything. Here the
/// policy is chosen once at construction and applied uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Creating a sale emits one outbound movement per item, and cancelling
    /// it emits compensating inbound movements - both inside the same
    /// transaction as the sale write.
    Automatic,
    /// The ledger is only touched by explicit movement recording; sales and
    /// cancellations never write movements.
    Manual,
}

impl Default for StockPolicy {
    fn default() -> Self {
        StockPolicy::Automatic
    }
}

// =============================================================================
// Catalog Entities
// =============================================================================

/// A branch of the shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Location {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A supplier of product for inbound restocking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An employee who records movements and sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Branch the employee works at.
    pub location_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Display name, e.g. for report rows.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A product sold by weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on tickets and reports.
    pub name: String,

    /// Price in cents per kilogram.
    pub price_cents_per_kg: i64,

    /// Unit of measure label ("kg" for everything today; kept for parity
    /// with per-piece products).
    pub unit: String,

    /// Cached on-hand weight at the owning location, in grams.
    ///
    /// Denormalized projection of the movement ledger. The ledger fold is
    /// authoritative; this value is maintained transactionally with every
    /// movement and can be repaired from the ledger at any time.
    pub cached_stock_grams: i64,

    /// Minimum-stock threshold in grams; at or below triggers a restock
    /// alert in the catalog UI.
    pub min_stock_grams: i64,

    /// Whether the product can currently be sold.
    pub is_available: bool,

    /// Branch that owns this product record.
    pub location_id: String,

    /// Habitual supplier, if any.
    pub provider_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the per-kilogram price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents_per_kg)
    }

    /// Returns the cached on-hand weight.
    #[inline]
    pub fn cached_stock(&self) -> Weight {
        Weight::from_grams(self.cached_stock_grams)
    }

    /// Whether the cached stock sits at or below the minimum threshold.
    #[inline]
    pub fn is_below_minimum(&self) -> bool {
        self.cached_stock_grams <= self.min_stock_grams
    }
}

// =============================================================================
// Stock Movements
// =============================================================================

/// One immutable entry in the stock ledger.
///
/// Never updated in place, never deleted in normal operation; the current
/// stock for (product, location) is the fold of these rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: String,
    pub kind: MovementKind,
    /// Always positive; direction is `kind`.
    pub weight_grams: i64,
    pub product_id: String,
    pub location_id: String,
    /// Employee who recorded the movement.
    pub employee_id: String,
    /// Supplier, for inbound restocking.
    pub provider_id: Option<String>,
    /// Sale that emitted this movement, when the stock policy couples the
    /// two. Doubles as the idempotency key for sale-driven decrements.
    pub sale_item_id: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl StockMovement {
    /// Returns the movement weight.
    #[inline]
    pub fn weight(&self) -> Weight {
        Weight::from_grams(self.weight_grams)
    }

    /// Signed contribution of this movement to a stock fold.
    #[inline]
    pub fn signed_weight(&self) -> Weight {
        Weight::from_grams(self.kind.sign() * self.weight_grams)
    }
}

/// Input for recording a movement. Ids are resolved against the catalog
/// before anything is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovement {
    pub kind: MovementKind,
    pub weight_grams: i64,
    pub product_id: String,
    pub location_id: String,
    pub employee_id: String,
    pub provider_id: Option<String>,
}

/// Conjunctive filter for listing movements. `None` means "don't filter".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<String>,
    pub location_id: Option<String>,
    /// Inclusive lower bound on `recorded_at`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `recorded_at`.
    pub to: Option<DateTime<Utc>>,
}

/// Folds movements into a net on-hand weight: Σ inbound − Σ outbound.
///
/// Pure counterpart of the SQL aggregate the ledger runs; order of events
/// does not matter.
pub fn fold_stock<'a, I>(movements: I) -> Weight
where
    I: IntoIterator<Item = &'a StockMovement>,
{
    movements
        .into_iter()
        .fold(Weight::zero(), |acc, m| acc + m.signed_weight())
}

// =============================================================================
// Sales
// =============================================================================

/// A committed sale header.
///
/// A sale only becomes visible once fully committed together with its
/// items; there is no persisted draft state. The only mutation ever applied
/// is the cancellation flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub employee_id: String,
    pub location_id: String,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
}

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Weight sold, in grams.
    pub weight_grams: i64,
    /// Per-kilogram price at time of sale (frozen).
    pub unit_price_cents: i64,
    /// round(weight × price), fixed at creation and never recomputed.
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the frozen per-kilogram price.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the frozen subtotal.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the weight sold.
    #[inline]
    pub fn weight(&self) -> Weight {
        Weight::from_grams(self.weight_grams)
    }
}

/// Input line for sale creation.
///
/// The caller supplies the price it showed the customer and the subtotal it
/// displayed; the transaction manager verifies the subtotal against
/// `round(weight × price)` before accepting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSaleItem {
    pub product_id: String,
    pub weight_grams: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

/// Input for sale creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub employee_id: String,
    pub location_id: String,
    pub items: Vec<NewSaleItem>,
}

/// A sale with its items and resolved references, as returned by lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub employee: Employee,
    pub location: Location,
}

impl SaleDetail {
    /// Sum of the frozen item subtotals.
    pub fn total(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.subtotal())
    }
}

/// Result of a cancellation request.
///
/// Cancelling an already-cancelled sale is a successful no-op, reported
/// distinctly so callers can tell the two outcomes apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOutcome {
    pub already_cancelled: bool,
}

// =============================================================================
// Reporting
// =============================================================================

/// Conjunctive filter for the daily summary. `None` means "don't filter".
/// The date range is inclusive on both ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location_id: Option<String>,
    pub product_id: Option<String>,
    pub employee_id: Option<String>,
}

/// One grouped summary row: (date, location, employee).
///
/// Groups with no matching sales are omitted, never emitted as zeros.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SummaryRow {
    pub sale_date: NaiveDate,
    pub location_id: String,
    pub location_name: String,
    pub employee_id: String,
    pub employee_name: String,
    /// Sum of frozen item subtotals, in cents.
    pub total_cents: i64,
    /// Sum of item weights, in grams.
    pub total_grams: i64,
    /// Number of line items (not sales).
    pub item_count: i64,
}

impl SummaryRow {
    /// Returns the row total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the row weight as Weight.
    #[inline]
    pub fn total_weight(&self) -> Weight {
        Weight::from_grams(self.total_grams)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
