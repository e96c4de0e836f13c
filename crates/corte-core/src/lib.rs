//! # corte-core: Pure Business Logic for Corte POS
//!
//! This crate is the **heart** of Corte POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Corte POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Callers (HTTP layer, desktop shell, exporters)     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ corte-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │money/weight│ │ validation│  │   error   │  │   │
//! │  │   │ Movement  │  │   Money   │  │   rules   │  │Validation │  │   │
//! │  │   │ Sale/Item │  │  Weight   │  │  checks   │  │  Error    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    corte-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, ledger/sale repositories     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, StockMovement, Sale, SummaryRow, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`weight`] - Weight type in integer grams
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Quantities**: Money is cents (i64), weight is grams (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use corte_core::money::Money;
//! use corte_core::weight::Weight;
//!
//! // $9.55 per kilogram, 1.333 kg on the scale
//! let price = Money::from_cents(955);
//! let weight = Weight::from_grams(1333);
//!
//! // The one rounding point for every line subtotal in the system
//! assert_eq!(price.subtotal_for(weight).cents(), 1273);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;
pub mod weight;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use corte_core::Money` instead of
// `use corte_core::money::Money`

pub use error::{ValidationError, ValidationResult};
pub use money::Money;
pub use types::*;
pub use weight::Weight;
