//! # Repository Layer
//!
//! Database access organized by concern:
//! - [`catalog`] - read-only lookups of locations, providers, employees,
//!   products
//! - [`ledger`] - append-only stock movement ledger and stock folds
//! - [`sale`] - atomic sale creation and idempotent cancellation
//! - [`report`] - date-bucketed sales aggregation
//!
//! Each repository owns a clone of the pool and is handed out by
//! [`crate::pool::Database`].

pub mod catalog;
pub mod ledger;
pub mod report;
pub mod sale;

pub use catalog::CatalogRepository;
pub use ledger::LedgerRepository;
pub use report::ReportRepository;
pub use sale::SaleRepository;
