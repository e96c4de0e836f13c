//! # corte-db: Database Layer for Corte POS
//!
//! This crate provides database access for the Corte POS inventory and
//! sales core. It uses SQLite for local storage with sqlx for async
//! operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Corte POS Data Flow                              │
//! │                                                                         │
//! │  Caller (API surface, desktop shell, seed tool)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     corte-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CatalogRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ LedgerRepo    │    │ 001_init.sql │  │   │
//! │  │   │ StockPolicy   │    │ SaleRepo      │    │              │  │   │
//! │  │   │               │    │ ReportRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repositories (catalog, ledger, sale, report)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use corte_db::{Database, DbConfig};
//! use corte_core::StockPolicy;
//!
//! let config = DbConfig::new("path/to/corte.db")
//!     .stock_policy(StockPolicy::Automatic);
//! let db = Database::new(config).await?;
//!
//! let stock = db.ledger().current_stock(&product_id, &location_id).await?;
//! let sale = db.sales().create(new_sale).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
