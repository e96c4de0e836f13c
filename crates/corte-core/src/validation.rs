//! # Validation Module
//!
//! Input validation for ledger and sale operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (pure checks, before any I/O)                    │
//! │  ├── weights positive, items non-empty, ids well-formed                │
//! │  └── subtotal consistency (round(weight × price) vs supplied)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Catalog resolution (corte-db, inside the transaction)        │
//! │  └── product/location/employee ids must resolve → NotFound             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (weight_grams > 0), NOT NULL                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Fail fast: a Layer 1 failure means nothing was written                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::types::{NewMovement, NewSale, NewSaleItem};
use crate::weight::Weight;

/// Allowed slack between a caller-supplied subtotal and the server-side
/// `round(weight × price)`, in cents. The original tickets were computed
/// with float math on the client; one cent absorbs its rounding wobble
/// while still rejecting real mismatches.
pub const SUBTOTAL_TOLERANCE_CENTS: i64 = 1;

// =============================================================================
// Scalar Validators
// =============================================================================

/// Validates a movement or line-item weight, in grams.
///
/// ## Rules
/// - Must be strictly positive; direction is carried by the movement kind,
///   never by a negative weight
pub fn validate_weight_grams(grams: i64) -> ValidationResult<()> {
    if grams <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "weight_grams".to_string(),
        });
    }
    Ok(())
}

/// Validates a per-kilogram price, in cents.
///
/// ## Rules
/// - Must not be negative
/// - Zero is allowed (giveaways, promotional cuts)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "unit_price_cents".to_string(),
        });
    }
    Ok(())
}

/// Validates an entity id string.
///
/// ## Rules
/// - Must not be empty
/// - Must parse as a UUID
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates an optional inclusive range (movement timestamps, report
/// dates): when both ends are present, start must not exceed end.
pub fn validate_range<T: PartialOrd>(
    field: &str,
    start: Option<&T>,
    end: Option<&T>,
) -> ValidationResult<()> {
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: "start is after end".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates a movement request before any write.
pub fn validate_movement(movement: &NewMovement) -> ValidationResult<()> {
    validate_weight_grams(movement.weight_grams)?;
    validate_id("product_id", &movement.product_id)?;
    validate_id("location_id", &movement.location_id)?;
    validate_id("employee_id", &movement.employee_id)?;
    if let Some(provider_id) = &movement.provider_id {
        validate_id("provider_id", provider_id)?;
    }
    Ok(())
}

/// Validates one sale line: positive weight, non-negative price, and a
/// subtotal consistent with `round(weight × price)` within
/// [`SUBTOTAL_TOLERANCE_CENTS`].
pub fn validate_sale_item(item: &NewSaleItem) -> ValidationResult<()> {
    validate_id("product_id", &item.product_id)?;
    validate_weight_grams(item.weight_grams)?;
    validate_price_cents(item.unit_price_cents)?;

    let expected = Money::from_cents(item.unit_price_cents)
        .subtotal_for(Weight::from_grams(item.weight_grams))
        .cents();
    if (expected - item.subtotal_cents).abs() > SUBTOTAL_TOLERANCE_CENTS {
        return Err(ValidationError::SubtotalMismatch {
            expected_cents: expected,
            supplied_cents: item.subtotal_cents,
        });
    }

    Ok(())
}

/// Validates a full sale request before any write: references well-formed,
/// items non-empty, every line valid.
pub fn validate_new_sale(sale: &NewSale) -> ValidationResult<()> {
    validate_id("employee_id", &sale.employee_id)?;
    validate_id("location_id", &sale.location_id)?;

    if sale.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for item in &sale.items {
        validate_sale_item(item)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MovementKind;

    const PRODUCT: &str = "550e8400-e29b-41d4-a716-446655440000";
    const LOCATION: &str = "550e8400-e29b-41d4-a716-446655440001";
    const EMPLOYEE: &str = "550e8400-e29b-41d4-a716-446655440002";

    fn valid_item() -> NewSaleItem {
        NewSaleItem {
            product_id: PRODUCT.to_string(),
            weight_grams: 1333,
            unit_price_cents: 955,
            subtotal_cents: 1273, // round(955 × 1333 / 1000)
        }
    }

    #[test]
    fn test_validate_weight_grams() {
        assert!(validate_weight_grams(1).is_ok());
        assert!(validate_weight_grams(50_000).is_ok());
        assert!(validate_weight_grams(0).is_err());
        assert!(validate_weight_grams(-500).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(955).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("product_id", PRODUCT).is_ok());
        assert!(validate_id("product_id", "").is_err());
        assert!(validate_id("product_id", "not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("dates", Some(&1), Some(&2)).is_ok());
        assert!(validate_range("dates", Some(&2), Some(&2)).is_ok());
        assert!(validate_range("dates", Some(&3), Some(&2)).is_err());
        assert!(validate_range::<i32>("dates", None, Some(&2)).is_ok());
        assert!(validate_range::<i32>("dates", None, None).is_ok());
    }

    #[test]
    fn test_validate_movement() {
        let movement = NewMovement {
            kind: MovementKind::Inbound,
            weight_grams: 50_000,
            product_id: PRODUCT.to_string(),
            location_id: LOCATION.to_string(),
            employee_id: EMPLOYEE.to_string(),
            provider_id: None,
        };
        assert!(validate_movement(&movement).is_ok());

        let zero_weight = NewMovement {
            weight_grams: 0,
            ..movement.clone()
        };
        assert!(validate_movement(&zero_weight).is_err());

        let bad_provider = NewMovement {
            provider_id: Some("nope".to_string()),
            ..movement
        };
        assert!(validate_movement(&bad_provider).is_err());
    }

    #[test]
    fn test_validate_sale_item_subtotal() {
        assert!(validate_sale_item(&valid_item()).is_ok());

        // one cent off is within float-client tolerance
        let off_by_one = NewSaleItem {
            subtotal_cents: 1272,
            ..valid_item()
        };
        assert!(validate_sale_item(&off_by_one).is_ok());

        // two cents off is a real mismatch
        let off_by_two = NewSaleItem {
            subtotal_cents: 1271,
            ..valid_item()
        };
        assert_eq!(
            validate_sale_item(&off_by_two),
            Err(ValidationError::SubtotalMismatch {
                expected_cents: 1273,
                supplied_cents: 1271,
            })
        );
    }

    #[test]
    fn test_validate_new_sale() {
        let sale = NewSale {
            employee_id: EMPLOYEE.to_string(),
            location_id: LOCATION.to_string(),
            items: vec![valid_item()],
        };
        assert!(validate_new_sale(&sale).is_ok());

        let empty = NewSale {
            items: vec![],
            ..sale.clone()
        };
        assert_eq!(
            validate_new_sale(&empty),
            Err(ValidationError::Required {
                field: "items".to_string(),
            })
        );

        let bad_weight = NewSale {
            items: vec![NewSaleItem {
                weight_grams: -100,
                ..valid_item()
            }],
            ..sale
        };
        assert!(validate_new_sale(&bad_weight).is_err());
    }
}
