//! # Error Types
//!
//! Domain-level validation errors for corte-core.
//!
//! ## Where Errors Live
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  corte-core (this file)                                                 │
//! │  └── ValidationError  - Input validation failures ("InvalidArgument")   │
//! │                                                                         │
//! │  corte-db (separate crate)                                              │
//! │  └── DbError          - NotFound, storage failures; wraps               │
//! │                         ValidationError so repositories return one type │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → caller                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation always runs before any write is attempted: when one of these
//! errors fires, nothing has been persisted.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These correspond to the caller-facing "InvalidArgument" outcome: the
/// request was malformed and the operation had no side effects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive (weights, item counts).
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative (prices).
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, inverted date range).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A caller-supplied line subtotal disagrees with round(weight × price).
    ///
    /// The transaction manager recomputes every subtotal server-side; a
    /// mismatch beyond rounding tolerance rejects the whole sale.
    #[error("line subtotal {supplied_cents} does not match computed {expected_cents}")]
    SubtotalMismatch {
        expected_cents: i64,
        supplied_cents: i64,
    },
}

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Required {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items is required");

        let err = ValidationError::MustBePositive {
            field: "weight".to_string(),
        };
        assert_eq!(err.to_string(), "weight must be positive");

        let err = ValidationError::SubtotalMismatch {
            expected_cents: 1273,
            supplied_cents: 1200,
        };
        assert_eq!(
            err.to_string(),
            "line subtotal 1200 does not match computed 1273"
        );
    }
}
